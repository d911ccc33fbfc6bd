//! Logging setup: console output plus a timestamped run log

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

use crate::adapters::MergeXConfig;
use crate::domain::errors::DomainError;
use crate::error::{MergeXError, MergeXResult};

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line format
    #[default]
    Pretty,
    /// One line per event
    Compact,
    /// JSON lines for structured logging
    Json,
}

impl LogFormat {
    /// Parse format name
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(DomainError::BadArgs(format!(
                "Invalid log format: {}. Valid formats: pretty, compact, json",
                other
            ))),
        }
    }
}

/// Name of the run log for a given start time
pub fn run_log_name(started: chrono::DateTime<Local>) -> String {
    format!("merger_{}.log", started.format("%Y%m%d_%H%M%S"))
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level. Returns the run log path, or
/// `None` when the log directory could not be written and only console
/// logging is active.
pub fn init(config: &MergeXConfig) -> MergeXResult<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level().as_filter()));

    let console: Box<dyn Layer<Registry> + Send + Sync> = match config.log_format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    let mut run_log_path = None;
    let mut file_error = None;
    let file_layer = match open_run_log(&config.log_dir) {
        Ok((path, file)) => {
            run_log_path = Some(path);
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        Err(e) => {
            file_error = Some(e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .with(filter)
        .try_init()
        .map_err(|e| MergeXError::Logging {
            message: e.to_string(),
        })?;

    match (&run_log_path, file_error) {
        (Some(path), _) => info!("Logging to file: {}", path.display()),
        (None, Some(e)) => warn!(
            "Could not open run log in {}, logging to console only: {}",
            config.log_dir.display(),
            e
        ),
        (None, None) => {}
    }

    Ok(run_log_path)
}

fn open_run_log(log_dir: &Path) -> std::io::Result<(PathBuf, File)> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(run_log_name(Local::now()));
    let file = File::create(&path)?;
    Ok((path, file))
}
