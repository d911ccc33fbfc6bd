// Ports - Interface definitions (contracts)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Inspect one file and return its primary video stream's resolution and duration
    async fn probe(&self, path: &Path) -> Result<MediaPart, ProbeError>;
}

/// Port for lossless concatenation
#[async_trait]
pub trait ConcatPort: Send + Sync {
    /// Merge `parts` in the given order into `output_path` without re-encoding.
    ///
    /// The output must not exist yet. On failure nothing is left at `output_path`.
    async fn concatenate(&self, parts: &[MediaPart], output_path: &Path) -> Result<(), MergeError>;
}

/// Port for per-folder diagnostic artifacts
#[async_trait]
pub trait DiagnosticsPort: Send + Sync {
    /// Write `<folder>_<kind>.log` and return its path
    async fn write_diagnostic(
        &self,
        folder: &str,
        kind: &str,
        body: &str,
    ) -> Result<PathBuf, DomainError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log error message
    async fn error(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);

    /// Log structured event
    async fn log_event(&self, event: &LogEvent);
}

/// Log event with structured data
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    /// Create an event without context
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    /// Attach a context field
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
