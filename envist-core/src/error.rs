//! Error types for Envist operations

use std::path::PathBuf;
use thiserror::Error;

/// Line-level parse errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing key: line is empty or starts with '='")]
    MissingKey,

    #[error("Invalid line format: {line}")]
    InvalidFormat { line: String },

    #[error("Invalid key format: {key}")]
    InvalidKey { key: String },

    #[error("Empty value for key '{key}' (enable accept_empty to allow)")]
    EmptyValue { key: String },

    #[error("Invalid type syntax: unbalanced brackets in '{annotation}'")]
    UnbalancedBrackets { annotation: String },

    #[error("Circular reference detected for variable: {name}")]
    CircularReference { name: String },

    #[error("Variable resolution nested deeper than {max_depth} levels")]
    TooDeepNesting { max_depth: usize },
}

/// Type annotation and value coercion errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CastError {
    #[error("Invalid type syntax: {annotation} ({reason})")]
    InvalidSyntax { annotation: String, reason: String },

    #[error("Unsupported type: {name}")]
    UnsupportedType { name: String },

    #[error("Unsupported nested type: {name}")]
    UnsupportedNestedType { name: String },

    #[error("{base} type requires exactly {expected} type argument(s), got {found}: {annotation}")]
    WrongArity {
        base: String,
        expected: usize,
        found: usize,
        annotation: String,
    },

    #[error("invalid integer literal: {value}")]
    InvalidInt { value: String },

    #[error("invalid float literal: {value}")]
    InvalidFloat { value: String },

    #[error("Invalid JSON format: {reason}")]
    InvalidJson { reason: String },

    #[error("Invalid CSV row: {reason}")]
    InvalidCsv { reason: String },

    #[error("expected {expected}, found {found}")]
    Shape { expected: String, found: String },

    #[error("cannot cast an empty value to {target}")]
    EmptyValue { target: String },

    #[error("Unable to cast \"{value}\" to \"{target}\": {cause}")]
    Failed {
        value: String,
        target: String,
        cause: Box<CastError>,
    },
}

impl CastError {
    /// Wrap a failure with the value and type that were being cast.
    ///
    /// Already-wrapped errors are returned unchanged so the outermost call
    /// site decides the reported value.
    pub fn failed(value: impl Into<String>, target: impl Into<String>, cause: CastError) -> Self {
        match cause {
            wrapped @ CastError::Failed { .. } => wrapped,
            cause => CastError::Failed {
                value: value.into(),
                target: target.into(),
                cause: Box::new(cause),
            },
        }
    }

    /// The innermost failure, skipping `Failed` wrappers.
    pub fn root_cause(&self) -> &CastError {
        match self {
            CastError::Failed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

/// Master error type for all Envist errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EnvistError {
    #[error("File not found: {}: {reason}", .path.display())]
    FileNotFound { path: PathBuf, reason: String },

    #[error("Failed to write {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },

    #[error("{}{source}", line_prefix(.line))]
    Parse {
        line: Option<usize>,
        #[source]
        source: ParseError,
    },

    #[error("{}{}{source}", line_prefix(.line), key_prefix(.key))]
    Cast {
        line: Option<usize>,
        key: Option<String>,
        #[source]
        source: CastError,
    },

    #[error("\"{key}\" not found in env")]
    KeyNotFound { key: String },

    #[error("data must be a mapping, got {found}")]
    NotAMapping { found: String },
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|l| format!("Line {}: ", l)).unwrap_or_default()
}

fn key_prefix(key: &Option<String>) -> String {
    key.as_ref()
        .map(|k| format!("Error processing variable '{}': ", k))
        .unwrap_or_default()
}

impl EnvistError {
    /// Attach a source line number to a parse or cast error.
    pub fn at_line(self, number: usize) -> Self {
        match self {
            EnvistError::Parse { source, .. } => EnvistError::Parse {
                line: Some(number),
                source,
            },
            EnvistError::Cast { key, source, .. } => EnvistError::Cast {
                line: Some(number),
                key,
                source,
            },
            other => other,
        }
    }

    /// Attach the key being processed to a cast error.
    pub fn for_key(self, name: &str) -> Self {
        match self {
            EnvistError::Cast { line, source, .. } => EnvistError::Cast {
                line,
                key: Some(name.to_string()),
                source,
            },
            other => other,
        }
    }

    /// Source line number, if the error was raised during a bulk load.
    pub fn line(&self) -> Option<usize> {
        match self {
            EnvistError::Parse { line, .. } | EnvistError::Cast { line, .. } => *line,
            _ => None,
        }
    }
}

impl From<ParseError> for EnvistError {
    fn from(source: ParseError) -> Self {
        EnvistError::Parse { line: None, source }
    }
}

impl From<CastError> for EnvistError {
    fn from(source: CastError) -> Self {
        EnvistError::Cast {
            line: None,
            key: None,
            source,
        }
    }
}

/// Result type alias for Envist operations.
pub type EnvistResult<T> = Result<T, EnvistError>;

// =============================================================================
// TESTS
// =============================================================================
