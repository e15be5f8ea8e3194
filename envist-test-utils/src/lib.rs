//! Envist Test Utilities
//!
//! Centralized test infrastructure for the Envist workspace:
//! - Proptest generators for type trees, keys and values
//! - Temp-file fixtures for `.env` files
//! - Custom assertions for Envist error variants

// Re-export core types for convenience
pub use envist_core::{
    CastError, CollectionKind, EnvMap, EnvistError, EnvistResult, MemoryEnv, ParseError,
    SimpleType, TypeNode, Value, ValueMap,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Envist types.

    use super::*;
    use proptest::prelude::*;

    /// A valid variable name: `^[A-Za-z_][A-Za-z0-9_]*$`.
    pub fn arb_key() -> impl Strategy<Value = String> {
        "[A-Za-z_][A-Za-z0-9_]{0,15}"
    }

    /// An untyped value that survives a save/reload unchanged: no quotes,
    /// no `${`, no comment marker, no surrounding whitespace.
    pub fn arb_plain_value() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_./:@-]{1,24}"
    }

    pub fn arb_simple_type() -> impl Strategy<Value = SimpleType> {
        prop::sample::select(SimpleType::ALL.to_vec())
    }

    pub fn arb_collection_kind() -> impl Strategy<Value = CollectionKind> {
        prop_oneof![
            Just(CollectionKind::List),
            Just(CollectionKind::Set),
            Just(CollectionKind::Tuple),
        ]
    }

    /// Arbitrary well-formed type trees up to four levels deep.
    pub fn arb_type_node() -> impl Strategy<Value = TypeNode> {
        arb_simple_type()
            .prop_map(TypeNode::simple)
            .prop_recursive(4, 16, 2, |inner| {
                prop_oneof![
                    (arb_collection_kind(), inner.clone())
                        .prop_map(|(kind, t)| TypeNode::collection(kind, t)),
                    (inner.clone(), inner).prop_map(|(k, v)| TypeNode::mapping(k, v)),
                ]
            })
    }

    /// Leaf values (no NaN, which never equals itself).
    pub fn arb_leaf_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            (-1.0e9f64..1.0e9).prop_map(Value::Float),
            "[a-z0-9 ]{0,12}".prop_map(Value::Str),
        ]
    }

    /// Nested values built from lists and string-keyed maps.
    pub fn arb_value() -> impl Strategy<Value = Value> {
        arb_leaf_value().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..4).prop_map(|pairs| {
                    Value::Map(
                        pairs
                            .into_iter()
                            .map(|(k, v)| (Value::Str(k), v))
                            .collect::<ValueMap>(),
                    )
                }),
            ]
        })
    }

    /// `(key, value)` pairs with distinct keys.
    pub fn arb_plain_entries() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::btree_map(arb_key(), arb_plain_value(), 1..12)
            .prop_map(|m| m.into_iter().collect())
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built `.env` files for common testing scenarios.

    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Mixed typed file exercising every annotation form.
    pub const TYPED_ENV: &str = r#"# Typed configuration
APP_NAME=envist
PORT<int>=8080
RATIO<float>=0.75
DEBUG<bool>=yes
PADDED<str>=  keep me  
HOSTS<list<str>>=a.example, b.example
PORTS<list<int>>=[8000, 8001]
LIMITS<dict<str, int>>=cpu:2, mem:512
GROUPS<dict<str, list<int>>>=g1=[1,2],g2=[3]
TAGS<set<str>>=x,y,x
PAIR<tuple<int>>=1,2
META<json>={"owner": "ops", "replicas": 3}
ROW<csv>=a,"b,c",d
TIMEOUT:int=30
BASE_URL=http://${APP_NAME}.local:${PORT} # trailing comment
"#;

    /// A `.env` file in its own temp directory, removed on drop.
    pub struct EnvFile {
        dir: TempDir,
        path: PathBuf,
    }

    impl EnvFile {
        /// Write `contents` to `<tempdir>/.env`.
        pub fn new(contents: &str) -> Self {
            let dir = tempfile::tempdir().expect("create temp dir");
            let path = dir.path().join(".env");
            std::fs::write(&path, contents).expect("write env fixture");
            Self { dir, path }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        pub fn dir(&self) -> &Path {
            self.dir.path()
        }

        pub fn read(&self) -> String {
            std::fs::read_to_string(&self.path).expect("read env fixture")
        }

        pub fn rewrite(&self, contents: &str) {
            std::fs::write(&self.path, contents).expect("rewrite env fixture");
        }

        /// A path inside the fixture directory that does not exist.
        pub fn missing_path(&self) -> PathBuf {
            self.dir.path().join("missing.env")
        }
    }

    /// Render `(key, value)` pairs as untyped `KEY=value` lines.
    pub fn plain_env(entries: &[(String, String)]) -> String {
        entries
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for Envist error variants.

    use super::*;

    /// Assert that an EnvistResult is Err with a parse error at `line`.
    #[track_caller]
    pub fn assert_parse_error_at<T: std::fmt::Debug>(result: &EnvistResult<T>, line: usize) {
        match result {
            Err(EnvistError::Parse { line: Some(l), .. }) => {
                assert_eq!(*l, line, "Wrong line in parse error");
            }
            other => panic!("Expected Parse error at line {}, got: {:?}", line, other),
        }
    }

    /// Assert that an EnvistResult is Err with a cast error.
    #[track_caller]
    pub fn assert_cast_error<T: std::fmt::Debug>(result: &EnvistResult<T>) {
        match result {
            Err(EnvistError::Cast { .. }) => {}
            other => panic!("Expected Cast error, got: {:?}", other),
        }
    }

    /// Assert that an EnvistResult is a KeyNotFound error for `key`.
    #[track_caller]
    pub fn assert_key_not_found<T: std::fmt::Debug>(result: &EnvistResult<T>, key: &str) {
        match result {
            Err(EnvistError::KeyNotFound { key: k }) => {
                assert_eq!(k, key, "Wrong key in KeyNotFound error");
            }
            other => panic!("Expected KeyNotFound for {}, got: {:?}", key, other),
        }
    }

    /// Assert that a cast error's innermost cause matches `pred`.
    #[track_caller]
    pub fn assert_root_cause(err: &CastError, pred: impl Fn(&CastError) -> bool) {
        assert!(pred(err.root_cause()), "Unexpected root cause: {:?}", err.root_cause());
    }
}

// ============================================================================
// TESTS
// ============================================================================
