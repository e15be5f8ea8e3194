//! Envist Core - Data Types
//!
//! Pure data structures shared by the parser and the loader: the `Value` sum
//! type, the ordered environment map, the type tree produced from
//! annotations, the error taxonomy and the environment access capability.
//! This crate contains no parsing logic.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod env;
pub mod error;
pub mod map;
pub mod types;
pub mod value;

pub use env::{EnvBridge, MemoryEnv, ProcessEnv};
pub use error::{CastError, EnvistError, EnvistResult, ParseError};
pub use map::EnvMap;
pub use types::{CollectionKind, SimpleType, TypeNode};
pub use value::{Value, ValueMap};

// ============================================================================
// KEY VALIDATION
// ============================================================================

static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static key pattern compiles")
});

/// Whether `key` is a valid variable name: `^[A-Za-z_][A-Za-z0-9_]*$`.
pub fn is_valid_key(key: &str) -> bool {
    KEY_PATTERN.is_match(key)
}
