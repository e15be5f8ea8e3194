//! Envist - Typed `.env` Loader
//!
//! Reads `KEY<TYPE>=VALUE` files, resolves `${NAME}` references and casts
//! values into typed [`Value`]s:
//!
//! ```text
//! # .env
//! PORT<int>=8080
//! HOSTS<list<str>>=a.example, b.example
//! LIMITS<dict<str, int>>=cpu:2, mem:512
//! URL=http://${HOST}:${PORT}
//! ```
//!
//! ```no_run
//! use envist::{Envist, Value};
//!
//! let env = Envist::open(".env")?;
//! assert_eq!(env.get("PORT"), Some(&Value::Int(8080)));
//! # Ok::<(), envist::EnvistError>(())
//! ```
//!
//! Parsing lives in `envist-dsl`; this crate adds the file reader, the
//! two-pass loader, persistence and logging setup.

pub mod config;
pub mod file;
pub mod loader;
pub mod persist;
pub mod telemetry;

pub use config::{LoadOptions, SaveOptions};
pub use file::{filter_lines, read_lines, SourceLine};
pub use loader::{Envist, DEFAULT_PATH};
pub use telemetry::{init_logging, LogConfig, LogFormat, TelemetryError};

// Re-export core types for convenience
pub use envist_core::{
    CastError, EnvBridge, EnvMap, EnvistError, EnvistResult, MemoryEnv, ParseError, ProcessEnv,
    TypeNode, Value, ValueMap,
};
pub use envist_dsl::{cast_str, cast_value, parse_type};
