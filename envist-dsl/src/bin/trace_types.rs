/// Type Annotation Tracer - Shows the flow annotation → TypeNode → Value
///
/// Usage: cargo run --bin trace_types <annotation> [value]

use envist_dsl::{coerce_str, parse_type, to_list, to_map};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin trace_types <annotation> [value]");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --bin trace_types 'dict<str, list<int>>' 'a=[1,2],b=[3]'");
        std::process::exit(1);
    }

    let annotation = &args[1];

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ TYPE ANNOTATION TRACER");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    println!("📝 INPUT ANNOTATION:");
    println!("{}", annotation);
    println!();

    let ty = match parse_type(annotation) {
        Ok(ty) => ty,
        Err(e) => {
            eprintln!("❌ Type error: {}", e);
            std::process::exit(1);
        }
    };

    println!("🌳 TYPE TREE:");
    println!("─────────────────────────────────────────────────────────────");
    println!("{:#?}", ty);
    println!("Canonical: {}", ty);
    println!("Depth: {}", ty.depth());
    println!();

    let Some(raw) = args.get(2) else {
        println!("✅ Parse succeeded!");
        return;
    };

    println!("🔍 TOKENS:");
    println!("─────────────────────────────────────────────────────────────");
    if ty.base_name() == "dict" {
        println!("{:#?}", to_map(raw));
    } else {
        println!("{:#?}", to_list(raw));
    }
    println!();

    println!("🎯 COERCED VALUE:");
    println!("─────────────────────────────────────────────────────────────");
    match coerce_str(raw, &ty) {
        Ok(value) => {
            println!("{:#?}", value);
            println!("Env string: {}", value);
            println!();
            println!("✅ Coercion succeeded!");
        }
        Err(e) => {
            println!("❌ Cast error: {}", e);
        }
    }
}
