//! Envist DSL - Typed `.env` Line Parser & Coercion Engine
//!
//! This crate turns one `KEY<TYPE>=VALUE` line at a time into a typed value.
//! Nested generic annotations such as `dict<str, list<int>>` are parsed into a
//! type tree which drives the coercion of the raw string.
//!
//! Architecture:
//! ```text
//! Raw line
//!     ↓
//! Line Validator (key, raw value, annotation)
//!     ↓                         ↓
//! Variable Resolver         Type Grammar Parser
//! (${NAME} substitution)    (annotation → TypeNode)
//!     ↓                         ↓
//! Structural Tokenizer (raw string → Token)
//!     ↓
//! Coercion Engine (Token × TypeNode → Value)
//! ```

pub mod coerce;
pub mod grammar;
pub mod line;
pub mod resolver;
pub mod tokenizer;

// Re-export key types for convenience
pub use coerce::{cast_str, cast_value, coerce, coerce_str, coerce_value};
pub use grammar::{parse_type, split_type_args};
pub use line::{parse_line, ParsedLine};
pub use resolver::{has_reference, resolve, ResolutionContext, MAX_RESOLUTION_DEPTH};
pub use tokenizer::{smart_split, to_csv, to_list, to_map, Token};
