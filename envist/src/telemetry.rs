//! Logging initialisation
//!
//! The library itself only emits `tracing` events. Binaries and tests that
//! want to see them call [`init_logging`] once at startup and keep the
//! returned guard alive so buffered file output is flushed.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::parse_flag;

/// Crates whose events the default filter lets through.
const LOG_TARGETS: [&str; 3] = ["envist", "envist_dsl", "envist_core"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("Failed to init subscriber: {reason}")]
    AlreadyInitialized { reason: String },

    #[error("Cannot open log file {}: {reason}", .path.display())]
    LogFile { path: PathBuf, reason: String },
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Standard,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON; anything else is standard.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Standard
        }
    }
}

/// Logging configuration from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Force `debug` level regardless of `level`.
    pub debug: bool,
    /// Level for the envist crates (e.g. "info", "warn").
    pub level: String,
    pub format: LogFormat,
    /// Also write events to this file.
    pub log_file: Option<PathBuf>,
    /// Roll `log_file` over daily instead of appending forever.
    pub rotating: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

impl LogConfig {
    /// Read `ENVIST_DEBUG`, `ENVIST_LOG_LEVEL`, `ENVIST_LOG_FORMAT`,
    /// `ENVIST_LOG_FILE` and `ENVIST_ROTATING_LOGS` through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            debug: lookup("ENVIST_DEBUG")
                .map(|s| parse_flag(&s))
                .unwrap_or(false),
            level: lookup("ENVIST_LOG_LEVEL")
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "info".to_string()),
            format: lookup("ENVIST_LOG_FORMAT")
                .map(|s| LogFormat::from_name(&s))
                .unwrap_or_default(),
            log_file: lookup("ENVIST_LOG_FILE")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            rotating: lookup("ENVIST_ROTATING_LOGS")
                .map(|s| parse_flag(&s))
                .unwrap_or(false),
        }
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_rotating(mut self, rotating: bool) -> Self {
        self.rotating = rotating;
        self
    }

    /// Level actually applied: `debug` when debug mode is on.
    pub fn effective_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            match self.level.as_str() {
                // Python-style names
                "warning" => "warn",
                "critical" => "error",
                other => other,
            }
        }
    }

    /// `EnvFilter` directive covering the envist crates.
    pub fn filter_directive(&self) -> String {
        let level = self.effective_level();
        LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install a global subscriber: `RUST_LOG` if set, otherwise the directive
/// built from `config`. Events go to stdout and, when `log_file` is set, to
/// that file through a non-blocking writer.
///
/// The returned guard flushes the file writer on drop; it is `None` without
/// a log file. Calling this twice returns `AlreadyInitialized`.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = config.filter_directive();
            EnvFilter::try_new(&directive).map_err(|e| TelemetryError::InvalidFilter {
                directive,
                reason: e.to_string(),
            })?
        }
    };

    let mut layers: Vec<BoxedLayer> = vec![match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Standard => tracing_subscriber::fmt::layer().boxed(),
    }];

    let guard = match &config.log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path, config.rotating)?);
            layers.push(match config.format {
                LogFormat::Json => tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
                LogFormat::Standard => tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            });
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized {
            reason: e.to_string(),
        })?;

    tracing::info!(
        level = config.effective_level(),
        format = ?config.format,
        log_file = ?config.log_file,
        rotating = config.rotating,
        "Logging initialized"
    );

    Ok(guard)
}

/// Appender for `path`: a single file, or daily files prefixed with the
/// file name when `rotating`.
pub fn file_appender(path: &Path, rotating: bool) -> Result<RollingFileAppender, TelemetryError> {
    let log_file_error = |reason: String| TelemetryError::LogFile {
        path: path.to_path_buf(),
        reason,
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| log_file_error("path has no file name".to_string()))?;
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let rotation = if rotating {
        Rotation::DAILY
    } else {
        Rotation::NEVER
    };

    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .map_err(|e| log_file_error(e.to_string()))
}
