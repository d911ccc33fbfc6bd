// Audit interactor - Compares a merged file's duration against its parts

use std::path::Path;
use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Interactor for the post-merge duration audit
pub struct AuditInteractor {
    probe_port: Arc<dyn ProbePort>,
    log_port: Arc<dyn LogPort>,
    tolerance: DurationTolerance,
}

impl AuditInteractor {
    /// Create new audit interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        log_port: Arc<dyn LogPort>,
        tolerance: DurationTolerance,
    ) -> Self {
        Self {
            probe_port,
            log_port,
            tolerance,
        }
    }

    /// Re-probe the merged file and compare with the expected total.
    ///
    /// Drift is reported, never fatal.
    pub async fn audit(
        &self,
        merged_path: &Path,
        expected: f64,
    ) -> Result<AuditResult, ProbeError> {
        let merged = self.probe_port.probe(merged_path).await?;
        let result = self.tolerance.evaluate(expected, merged.duration);

        if result.within_tolerance {
            self.log_port
                .info(&format!(
                    "Output duration {:.2}s matches parts total {:.2}s (diff {:.2}s)",
                    result.actual_duration, result.expected_duration, result.delta_seconds
                ))
                .await;
        } else {
            self.log_port
                .warn(&format!(
                    "Output duration mismatch for {}: expected {:.2}s, got {:.2}s (diff {:.2}s, tolerance {:.2}s)",
                    display_name(merged_path),
                    result.expected_duration,
                    result.actual_duration,
                    result.delta_seconds,
                    result.tolerance_seconds
                ))
                .await;
        }

        Ok(result)
    }
}
