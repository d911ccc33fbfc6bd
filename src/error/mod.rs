//! Error handling module for MergeX

use thiserror::Error;

use crate::domain::errors::{BatchError, DomainError};

/// Main error type for MergeX operations
#[derive(Error, Debug)]
pub enum MergeXError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] DomainError),

    /// Logging could not be initialized
    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    /// Batch could not start
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Summary could not be rendered
    #[error("Failed to render summary: {message}")]
    Render { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for MergeX operations
pub type MergeXResult<T> = std::result::Result<T, MergeXError>;
