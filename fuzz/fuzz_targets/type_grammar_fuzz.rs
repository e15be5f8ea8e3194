//! Fuzz test for the Envist type annotation grammar
//!
//! Feeds arbitrary text to the annotation parser and the line validator to find:
//! - Panics on unbalanced or deeply nested brackets
//! - Canonical forms that do not parse back to the same tree
//!
//! Run with: cargo +nightly fuzz run type_grammar_fuzz -- -max_total_time=60

#![no_main]

use envist_dsl::{parse_line, parse_type};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(ty) = parse_type(input) {
            // Canonical text must parse back to the same tree
            let canonical = ty.to_string();
            assert_eq!(parse_type(&canonical).as_ref(), Ok(&ty));
            assert!(ty.depth() >= 1);
        }

        // Same bytes as the head of a line
        let line = format!("KEY<{}>=value", input);
        if let Ok(parsed) = parse_line(&line, true) {
            assert_eq!(parsed.key, "KEY");
            assert!(parsed.type_annotation.is_some());
        }
    }
});
