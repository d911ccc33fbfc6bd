// Tracing log adapter - Structured logging using tracing crate

use crate::ports::*;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

/// Tracing log adapter
#[derive(Debug, Clone, Default)]
pub struct TracingLogAdapter;

impl TracingLogAdapter {
    /// Create new tracing log adapter.
    ///
    /// The subscriber itself is installed by `utils::logging::init`.
    pub fn new() -> Self {
        Self
    }

    fn render_context(event: &LogEvent) -> String {
        event
            .context
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        info!("{}", message);
    }

    async fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    async fn error(&self, message: &str) {
        error!("{}", message);
    }

    async fn debug(&self, message: &str) {
        debug!("{}", message);
    }

    async fn log_event(&self, event: &LogEvent) {
        let context = Self::render_context(event);

        // Log structured event based on level
        match event.level {
            LogLevel::Error => {
                tracing::error!(message = %event.message, context = %context);
            }
            LogLevel::Warn => {
                tracing::warn!(message = %event.message, context = %context);
            }
            LogLevel::Info => {
                tracing::info!(message = %event.message, context = %context);
            }
            LogLevel::Debug => {
                tracing::debug!(message = %event.message, context = %context);
            }
            LogLevel::Trace => {
                tracing::trace!(message = %event.message, context = %context);
            }
        }
    }
}
