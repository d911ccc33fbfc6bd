// Validate interactor - Decides whether a folder's parts can be merged losslessly

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Interactor for the folder validation use case
pub struct ValidateInteractor {
    probe_port: Arc<dyn ProbePort>,
    log_port: Arc<dyn LogPort>,
    ordering: PartOrdering,
}

impl ValidateInteractor {
    /// Create new validate interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        log_port: Arc<dyn LogPort>,
        ordering: PartOrdering,
    ) -> Self {
        Self {
            probe_port,
            log_port,
            ordering,
        }
    }

    /// Validate candidates and return the parts in merge order.
    ///
    /// Probing stops at the first failure; later files are never inspected.
    pub async fn validate(&self, mut candidates: Vec<PathBuf>) -> ValidationVerdict {
        if candidates.is_empty() {
            return ValidationVerdict::rejected(
                RejectReason::NoVideoFiles,
                "No .mp4 or .mkv files found in folder.\n",
            );
        }

        PartSequencer::sort(&mut candidates, self.ordering);

        let mut parts = Vec::with_capacity(candidates.len());
        for path in &candidates {
            match self.probe_port.probe(path).await {
                Ok(part) => {
                    self.log_port
                        .debug(&format!(
                            "  - {}: {}, {:.2}s",
                            part.file_name(),
                            part.resolution,
                            part.duration
                        ))
                        .await;
                    parts.push(part);
                }
                Err(e) => {
                    self.log_port
                        .error(&format!(
                            "Could not get metadata for {}: {}",
                            display_name(path),
                            e
                        ))
                        .await;
                    return ValidationVerdict::rejected(
                        RejectReason::ProbeFailure,
                        format!(
                            "Failed to get metadata for video part: {}\n{}\n",
                            path.display(),
                            e
                        ),
                    );
                }
            }
        }

        if let Err(rejection) = PartRules::check_durations(&parts) {
            return ValidationVerdict::Rejected(rejection);
        }
        if let Err(rejection) = PartRules::check_resolutions(&parts) {
            return ValidationVerdict::Rejected(rejection);
        }

        ValidationVerdict::Mergeable(parts)
    }
}
