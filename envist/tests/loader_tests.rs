//! Integration tests for the two-pass loader
//!
//! Tests verify:
//! - Every annotation form loads into the expected typed value
//! - Errors carry the 1-based source line and abort the whole load
//! - `${NAME}` resolution against the file, then the environment
//! - Empty-value policy split by type kind
//! - set / unset / reload keep the environment bridge in sync

use envist::{EnvBridge, Envist, EnvistError, LoadOptions, MemoryEnv, ParseError, Value, ValueMap};
use envist_test_utils::assertions::{assert_cast_error, assert_key_not_found, assert_parse_error_at};
use envist_test_utils::fixtures::{EnvFile, TYPED_ENV};

// ============================================================================
// HELPERS
// ============================================================================

fn load(contents: &str) -> (EnvFile, Envist<MemoryEnv>) {
    load_with(contents, LoadOptions::default())
}

fn load_with(contents: &str, options: LoadOptions) -> (EnvFile, Envist<MemoryEnv>) {
    let file = EnvFile::new(contents);
    let env = Envist::with_bridge(file.path(), options, MemoryEnv::new()).expect("load env file");
    (file, env)
}

fn try_load(contents: &str, options: LoadOptions) -> Result<Envist<MemoryEnv>, EnvistError> {
    let file = EnvFile::new(contents);
    Envist::with_bridge(file.path(), options, MemoryEnv::new())
}

fn ints(items: &[i64]) -> Value {
    Value::List(items.iter().copied().map(Value::Int).collect())
}

fn strs(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| Value::str(*s)).collect())
}

// ============================================================================
// TYPED LOADING
// ============================================================================

#[test]
fn test_typed_fixture() {
    let (_file, env) = load(TYPED_ENV);

    assert_eq!(env.get("APP_NAME"), Some(&Value::str("envist")));
    assert_eq!(env.get("PORT"), Some(&Value::Int(8080)));
    assert_eq!(env.get("RATIO"), Some(&Value::Float(0.75)));
    assert_eq!(env.get("DEBUG"), Some(&Value::Bool(true)));
    assert_eq!(env.get("PADDED"), Some(&Value::str("  keep me  ")));
    assert_eq!(env.get("HOSTS"), Some(&strs(&["a.example", "b.example"])));
    assert_eq!(env.get("PORTS"), Some(&ints(&[8000, 8001])));
    assert_eq!(env.get("TAGS"), Some(&Value::set(vec![Value::str("x"), Value::str("y")])));
    assert_eq!(env.get("PAIR"), Some(&Value::Tuple(vec![Value::Int(1), Value::Int(2)])));
    assert_eq!(env.get("ROW"), Some(&strs(&["a", "b,c", "d"])));
    assert_eq!(env.get("TIMEOUT"), Some(&Value::Int(30)));
    assert_eq!(env.get("BASE_URL"), Some(&Value::str("http://envist.local:8080")));

    let limits = env.get("LIMITS").and_then(Value::as_map).unwrap();
    assert_eq!(limits.get_str("mem"), Some(&Value::Int(512)));

    let groups = env.get("GROUPS").and_then(Value::as_map).unwrap();
    assert_eq!(groups.get_str("g1"), Some(&ints(&[1, 2])));
    assert_eq!(groups.get_str("g2"), Some(&ints(&[3])));

    let meta = env.get("META").and_then(Value::as_map).unwrap();
    assert_eq!(meta.get_str("replicas"), Some(&Value::Int(3)));
}

#[test]
fn test_values_are_mirrored_as_strings() {
    let (_file, env) = load("PORT<int>=8080\nHOSTS<list<str>>=a,b\nNAME=x\n");
    let bridge = env.bridge();
    assert_eq!(bridge.get("PORT").as_deref(), Some("8080"));
    assert_eq!(bridge.get("HOSTS").as_deref(), Some(r#"["a","b"]"#));
    assert_eq!(bridge.get("NAME").as_deref(), Some("x"));
}

#[test]
fn test_insertion_order_and_duplicates() {
    let (_file, env) = load("B=1\nA=2\nB=3\n");
    assert_eq!(env.keys().collect::<Vec<_>>(), vec!["B", "A"]);
    assert_eq!(env.get("B"), Some(&Value::str("3")));
}

#[test]
fn test_scientific_float_and_deep_nesting() {
    let (_file, env) = load(
        "SMALL<float>=1.5e-10\nCUBE<list<list<list<int>>>>=[[[1,2],[3,4]],[[5,6],[7,8]]]\n",
    );
    assert_eq!(env.get("SMALL"), Some(&Value::Float(1.5e-10)));
    assert_eq!(
        env.get("CUBE"),
        Some(&Value::List(vec![
            Value::List(vec![ints(&[1, 2]), ints(&[3, 4])]),
            Value::List(vec![ints(&[5, 6]), ints(&[7, 8])]),
        ]))
    );
}

#[test]
fn test_str_annotation_strips_quotes_with_spaced_separator() {
    let (_file, env) = load("GREETING<str> = \"hello\"\nPADDED<str> = \"  x  \"\nSHORT:str = 'x'\nOTHER = \"hello\"\n");
    assert_eq!(env.get("GREETING"), Some(&Value::str("hello")));
    assert_eq!(env.get("PADDED"), Some(&Value::str("  x  ")));
    assert_eq!(env.get("SHORT"), Some(&Value::str("x")));
    assert_eq!(env.get("GREETING"), env.get("OTHER"));
}

#[test]
fn test_json_dict_keeps_key_order() {
    let (_file, env) = load("CFG<dict>={\"zeta\": 1, \"alpha\": 2}\n");
    let keys: Vec<_> = env
        .get("CFG")
        .and_then(Value::as_map)
        .map(|m| m.keys().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    assert_eq!(keys, vec!["zeta", "alpha"]);
    assert_eq!(
        env.bridge().get("CFG").as_deref(),
        Some(r#"{"zeta":1,"alpha":2}"#)
    );
}

#[test]
fn test_int_list_rejects_out_of_range_floats() {
    let result = try_load("BIG<list<int>>=[1e30, 2]\n", LoadOptions::default());
    assert_cast_error(&result);
}

#[test]
fn test_single_item_list() {
    let (_file, env) = load("SINGLE_ITEM_LIST<list<int>>=42\n");
    assert_eq!(env.get("SINGLE_ITEM_LIST"), Some(&ints(&[42])));
}

#[test]
fn test_auto_cast_disabled_keeps_strings() {
    let (_file, env) = load_with(
        "PORT<int>=8080\nHOSTS<list<str>>=a,b\n",
        LoadOptions::new().with_auto_cast(false),
    );
    assert_eq!(env.get("PORT"), Some(&Value::str("8080")));
    assert_eq!(env.get("HOSTS"), Some(&Value::str("a,b")));
}

#[test]
fn test_loading_twice_is_idempotent() {
    let file = EnvFile::new(TYPED_ENV);
    let a = Envist::with_bridge(file.path(), LoadOptions::default(), MemoryEnv::new()).unwrap();
    let b = Envist::with_bridge(file.path(), LoadOptions::default(), MemoryEnv::new()).unwrap();
    assert_eq!(a.get_all(), b.get_all());
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_missing_file() {
    let file = EnvFile::new("");
    let result = Envist::with_bridge(file.missing_path(), LoadOptions::default(), MemoryEnv::new());
    assert!(matches!(result, Err(EnvistError::FileNotFound { .. })));
}

#[test]
fn test_parse_error_carries_line_number() {
    let result = try_load("VALID=1\nINVALID-KEY=2\n", LoadOptions::default());
    assert_parse_error_at(&result, 2);
    assert!(result.unwrap_err().to_string().contains("Line 2"));
}

#[test]
fn test_line_numbers_count_comments_and_blanks() {
    let result = try_load("# header\n\nA=1\n=oops\n", LoadOptions::default());
    assert_parse_error_at(&result, 4);
}

#[test]
fn test_cast_error_carries_line_and_key() {
    let result = try_load("A=1\nPORT<int>=not_a_number\n", LoadOptions::default());
    assert_cast_error(&result);

    let err = result.unwrap_err();
    assert_eq!(err.line(), Some(2));
    let msg = err.to_string();
    assert!(msg.contains("Line 2"));
    assert!(msg.contains("'PORT'"));
    assert!(msg.contains("not_a_number"));
}

#[test]
fn test_invalid_annotation_is_a_cast_error() {
    let result = try_load("X<foo<int>>=1\n", LoadOptions::default());
    assert_cast_error(&result);
}

#[test]
fn test_circular_reference_aborts_load() {
    let file = EnvFile::new("A=${B}\nB=${A}\nC=fine\n");
    let err = Envist::with_bridge(file.path(), LoadOptions::default(), MemoryEnv::new())
        .unwrap_err();

    assert!(matches!(
        err,
        EnvistError::Parse {
            source: ParseError::CircularReference { .. },
            ..
        }
    ));
    assert!(err.to_string().contains("Circular reference"));
}

#[test]
fn test_failed_load_mirrors_nothing() {
    let file = EnvFile::new("GOOD=1\nBAD<int>=x\n");
    let mut bridge = MemoryEnv::new();
    let result = Envist::with_bridge(file.path(), LoadOptions::default(), &mut bridge);
    assert!(result.is_err());
    assert!(bridge.is_empty());
}

// ============================================================================
// VARIABLE RESOLUTION
// ============================================================================

#[test]
fn test_reference_to_earlier_key() {
    let (_file, env) = load("VAR1=value1\nVAR2=${VAR1}_extended\n");
    assert_eq!(env.get("VAR2"), Some(&Value::str("value1_extended")));
}

#[test]
fn test_reference_to_later_key_and_chain() {
    let (_file, env) = load("A=${B}\nB=${C}\nC=literal\n");
    assert_eq!(env.get("A"), Some(&Value::str("literal")));
}

#[test]
fn test_resolved_value_is_cast() {
    let (_file, env) = load("BASE<int>=10\nNEXT<list<int>>=${BASE},11\n");
    assert_eq!(env.get("NEXT"), Some(&ints(&[10, 11])));
}

#[test]
fn test_environment_fallback_and_undefined() {
    let file = EnvFile::new("HOME_PATH=${ENVIST_TEST_HOME}/app\nMISSING=[${NOPE}]\n");
    let bridge = MemoryEnv::with_vars([("ENVIST_TEST_HOME", "/srv")]);
    let env = Envist::with_bridge(file.path(), LoadOptions::default(), bridge).unwrap();

    assert_eq!(env.get("HOME_PATH"), Some(&Value::str("/srv/app")));
    assert_eq!(env.get("MISSING"), Some(&Value::str("[]")));
}

// ============================================================================
// EMPTY VALUES
// ============================================================================

#[test]
fn test_empty_value_rejected_by_default() {
    let result = try_load("A=1\nEMPTY=\n", LoadOptions::default());
    assert_parse_error_at(&result, 2);
}

#[test]
fn test_empty_value_accepted_as_null() {
    let (_file, env) = load_with("EMPTY=\nBARE\n", LoadOptions::new().with_accept_empty(true));
    assert_eq!(env.get("EMPTY"), Some(&Value::Null));
    assert_eq!(env.get("BARE"), Some(&Value::Null));
    assert_eq!(env.bridge().get("EMPTY").as_deref(), Some(""));
}

#[test]
fn test_empty_scalar_with_type_is_cast_error() {
    for options in [LoadOptions::default(), LoadOptions::new().with_accept_empty(true)] {
        let result = try_load("EMPTY_WITH_TYPE:int=\n", options);
        assert_cast_error(&result);
    }
}

#[test]
fn test_empty_collections() {
    let (_file, env) = load("EMPTY_LIST<list<str>>=\nEMPTY_DICT<dict<str, str>>=\n");
    assert_eq!(env.get("EMPTY_LIST"), Some(&Value::List(vec![])));
    assert_eq!(env.get("EMPTY_DICT"), Some(&Value::Map(ValueMap::new())));
}

// ============================================================================
// RUNTIME API
// ============================================================================

#[test]
fn test_get_as_does_not_touch_stored_value() {
    let (_file, env) = load("PORT=8080\nNAME=abc\n");

    assert_eq!(env.get_as("PORT", "int").unwrap(), Value::Int(8080));
    assert_eq!(env.get("PORT"), Some(&Value::str("8080")));

    assert_cast_error(&env.get_as("NAME", "int"));
    assert_eq!(env.get("NAME"), Some(&Value::str("abc")));

    assert_key_not_found(&env.get_as("NOPE", "int"), "NOPE");
}

#[test]
fn test_get_or_and_index() {
    let (_file, env) = load("A=1\n");
    assert_eq!(env.get_or("B", Value::str("fallback")), Value::str("fallback"));
    assert_eq!(env["A"], Value::str("1"));
    assert!(env.contains_key("A"));
    assert_eq!(env.len(), 1);
    assert!(!env.is_empty());
}

#[test]
#[should_panic(expected = "not found")]
fn test_index_missing_key_panics() {
    let (_file, env) = load("A=1\n");
    let _ = &env["B"];
}

#[test]
fn test_set_mirrors_and_resolves() {
    let (_file, mut env) = load("HOST=localhost\nPORT<int>=5432\n");

    env.set("URL", "postgres://${HOST}:${PORT}/db").unwrap();
    assert_eq!(env.get("URL"), Some(&Value::str("postgres://localhost:5432/db")));
    assert_eq!(
        env.bridge().get("URL").as_deref(),
        Some("postgres://localhost:5432/db")
    );

    env.set("RETRIES", 3).unwrap();
    assert_eq!(env.bridge().get("RETRIES").as_deref(), Some("3"));
}

#[test]
fn test_set_rejects_invalid_key() {
    let (_file, mut env) = load("A=1\n");
    let err = env.set("BAD KEY", "x").unwrap_err();
    assert!(matches!(
        err,
        EnvistError::Parse {
            source: ParseError::InvalidKey { .. },
            ..
        }
    ));
    assert!(!env.contains_key("BAD KEY"));
}

#[test]
fn test_set_typed() {
    let (_file, mut env) = load("BASE=1\n");
    env.set_typed("IDS", "${BASE},2,3", "list<int>").unwrap();
    assert_eq!(env.get("IDS"), Some(&ints(&[1, 2, 3])));

    assert_cast_error(&env.set_typed("BAD", "x", "int"));
    assert!(!env.contains_key("BAD"));
}

#[test]
fn test_set_all_and_set_from_value() {
    let (_file, mut env) = load("A=1\n");
    env.set_all([("B", "2"), ("C", "3")]).unwrap();
    assert_eq!(env.len(), 3);

    let data = Value::Map(
        vec![(Value::str("D"), Value::Int(4))]
            .into_iter()
            .collect::<ValueMap>(),
    );
    env.set_from_value(&data).unwrap();
    assert_eq!(env.get("D"), Some(&Value::Int(4)));

    let err = env.set_from_value(&Value::List(vec![])).unwrap_err();
    assert!(matches!(err, EnvistError::NotAMapping { .. }));
}

#[test]
fn test_unset() {
    let (_file, mut env) = load("A=1\nB=2\n");
    env.unset("A").unwrap();
    assert!(!env.contains_key("A"));
    assert_eq!(env.bridge().get("A"), None);

    let result = env.unset("A");
    assert_key_not_found(&result, "A");
    assert_eq!(result.unwrap_err().to_string(), "\"A\" not found in env");
}

#[test]
fn test_unset_all_checks_every_key_first() {
    let (_file, mut env) = load("A=1\nB=2\nC=3\n");
    assert_key_not_found(&env.unset_all(Some(&["A", "NOPE"])), "NOPE");
    assert!(env.contains_key("A"));

    env.unset_all(Some(&["A", "B"])).unwrap();
    assert_eq!(env.keys().collect::<Vec<_>>(), vec!["C"]);

    env.unset_all(None).unwrap();
    assert!(env.is_empty());
    assert!(env.bridge().is_empty());
}

#[test]
fn test_unset_all_with_repeated_key() {
    let (_file, mut env) = load("A=1\nB=2\n");
    env.unset_all(Some(&["A", "A"])).unwrap();
    assert_eq!(env.keys().collect::<Vec<_>>(), vec!["B"]);
    assert_eq!(env.bridge().get("A"), None);
}

#[test]
fn test_reload_picks_up_changes() {
    let (file, mut env) = load("A=1\nB=2\n");
    file.rewrite("A=10\nC=3\n");
    env.reload().unwrap();

    assert_eq!(env.get("A"), Some(&Value::str("10")));
    assert_eq!(env.get("B"), None);
    assert_eq!(env.bridge().get("B"), None);
    assert_eq!(env.bridge().get("C").as_deref(), Some("3"));
}

#[test]
fn test_display() {
    let (file, env) = load("A=1\n");
    assert_eq!(env.to_string(), format!("<Envist path=\"{}\">", file.path().display()));
}

#[test]
fn test_process_environment_bridge() {
    let file = EnvFile::new("ENVIST_LOADER_TEST_PROCESS_VAR<int>=42\n");
    let env = Envist::open(file.path()).unwrap();
    assert_eq!(env.get("ENVIST_LOADER_TEST_PROCESS_VAR"), Some(&Value::Int(42)));
    assert_eq!(
        std::env::var("ENVIST_LOADER_TEST_PROCESS_VAR").as_deref(),
        Ok("42")
    );
}
