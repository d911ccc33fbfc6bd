// Domain errors - Error types for the domain layer

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid value supplied by configuration or caller
    #[error("Bad arguments: {0}")]
    BadArgs(String),
    /// Filesystem operation failed
    #[error("File system error: {0}")]
    FsFail(String),
}

/// Failure of a single external tool invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// Executable could not be found
    #[error("{tool} not found: {message}")]
    NotFound { tool: String, message: String },

    /// Executable exists but could not be started
    #[error("failed to start {tool}: {message}")]
    SpawnFailed { tool: String, message: String },

    /// Process did not finish in time and was killed
    #[error("{tool} timed out after {}s", .timeout.as_secs())]
    TimedOut { tool: String, timeout: Duration },

    /// Process exited with a failure status
    #[error("{tool} exited with {status}")]
    NonZeroExit {
        tool: String,
        status: String,
        stderr: String,
    },
}

impl ToolError {
    /// Captured stderr, if the process got far enough to produce any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ToolError::NonZeroExit { stderr, .. } if !stderr.trim().is_empty() => Some(stderr),
            _ => None,
        }
    }
}

/// Errors produced while inspecting one media file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// Inspection tool cannot be located
    #[error("inspection tool missing: {0}")]
    ToolMissing(String),

    /// Inspection tool failed or timed out
    #[error("inspection of {path} failed: {source}")]
    ToolFailed {
        path: PathBuf,
        #[source]
        source: ToolError,
    },

    /// Inspection output lacked the expected fields
    #[error("unparsable metadata for {path}: {message}")]
    UnparsableOutput { path: PathBuf, message: String },
}

impl ProbeError {
    /// Attach the probed path to a tool failure
    pub fn from_tool(path: impl Into<PathBuf>, err: ToolError) -> Self {
        match err {
            ToolError::NotFound { message, .. } => ProbeError::ToolMissing(message),
            other => ProbeError::ToolFailed {
                path: path.into(),
                source: other,
            },
        }
    }
}

/// Errors produced while concatenating a folder's parts
#[derive(Error, Debug)]
pub enum MergeError {
    /// Merge tool cannot be located
    #[error("merge tool missing: {0}")]
    ToolMissing(String),

    /// Merge tool failed or timed out
    #[error("merge tool failed: {reason}")]
    ToolFailed { reason: String, stderr: Option<String> },

    /// Output appeared before the merge could claim it
    #[error("output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// Manifest or output file handling failed
    #[error("I/O error during merge: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ToolError> for MergeError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound { message, .. } => MergeError::ToolMissing(message),
            other => MergeError::ToolFailed {
                stderr: other.stderr().map(str::to_string),
                reason: other.to_string(),
            },
        }
    }
}

impl MergeError {
    /// Diagnostic body written next to the run log
    pub fn diagnostic_body(&self) -> String {
        match self {
            MergeError::ToolFailed {
                stderr: Some(stderr),
                ..
            } => stderr.clone(),
            MergeError::ToolFailed { reason, stderr: None } => {
                format!("No stderr captured from ffmpeg.\n{}\n", reason)
            }
            other => format!("{}\n", other),
        }
    }
}

/// Errors that abort a whole batch before any folder is processed
#[derive(Error, Debug)]
pub enum BatchError {
    /// Required external tool not on the search path
    #[error("required tool '{tool}' not found on PATH: {message}")]
    ToolMissing { tool: String, message: String },

    /// Source directory missing or unreadable
    #[error("source directory {} is not readable: {message}", .path.display())]
    SourceUnreadable { path: PathBuf, message: String },

    /// Output directory could not be created
    #[error("output directory {} could not be created: {message}", .path.display())]
    OutputUncreatable { path: PathBuf, message: String },
}
