//! MergeX Batch Video Merger Library
//!
//! Validates and losslessly concatenates multi-part videos, one output file per
//! source subfolder.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use adapters::{MergeXConfig, TomlConfigAdapter};
pub use app::{AppContainer, BatchInteractor, DefaultAppContainer};
pub use domain::errors::{BatchError, DomainError, MergeError, ProbeError};
pub use domain::model::{MergeOutcome, RejectReason, RunSummary};
pub use error::{MergeXError, MergeXResult};
