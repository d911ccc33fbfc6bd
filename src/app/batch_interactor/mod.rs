// Batch interactor - Orchestrates discovery, validation, merge and audit for every folder

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::app::audit_interactor::AuditInteractor;
use crate::app::validate_interactor::ValidateInteractor;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

const SEPARATOR: &str = "--------------------------------------------------";
const IO_ERROR_KIND: &str = "io_error";

/// Interactor for the batch merge use case
pub struct BatchInteractor {
    validator: Arc<ValidateInteractor>,
    auditor: Arc<AuditInteractor>,
    concat_port: Arc<dyn ConcatPort>,
    diagnostics_port: Arc<dyn DiagnosticsPort>,
    log_port: Arc<dyn LogPort>,
    ordering: PartOrdering,
    exclude_prefixes: Vec<String>,
}

impl BatchInteractor {
    /// Create new batch interactor with injected collaborators
    pub fn new(
        validator: Arc<ValidateInteractor>,
        auditor: Arc<AuditInteractor>,
        concat_port: Arc<dyn ConcatPort>,
        diagnostics_port: Arc<dyn DiagnosticsPort>,
        log_port: Arc<dyn LogPort>,
        ordering: PartOrdering,
        exclude_prefixes: Vec<String>,
    ) -> Self {
        Self {
            validator,
            auditor,
            concat_port,
            diagnostics_port,
            log_port,
            ordering,
            exclude_prefixes,
        }
    }

    /// Process every eligible subdirectory of `source_dir`, one at a time.
    ///
    /// Only preflight problems abort the batch; each folder ends up as exactly
    /// one report in the returned summary.
    pub async fn run(
        &self,
        source_dir: &Path,
        output_dir: &Path,
    ) -> Result<RunSummary, BatchError> {
        let (source_dir, output_dir) = self.preflight(source_dir, output_dir).await?;
        let mut summary = RunSummary::new(&source_dir, &output_dir);

        let folders = self.discover_folders(&source_dir).await;
        self.log_port
            .info(&format!(
                "Found {} folder(s) to process in {}",
                folders.len(),
                source_dir.display()
            ))
            .await;

        for folder in folders {
            let name = display_name(&folder);
            let mut notes = Vec::new();
            let task = self.build_task(&folder, &output_dir, &mut notes);
            for note in &notes {
                self.log_port.log_event(note).await;
            }
            let report = match task {
                Ok(task) => self.process_folder(task).await,
                Err(e) => {
                    self.log_port
                        .error(&format!("Could not list files in folder {}: {}", name, e))
                        .await;
                    let body = format!(
                        "Failed to list video parts in folder: {}\n{}\n",
                        folder.display(),
                        e
                    );
                    let diagnostic = self.write_diagnostic(&name, IO_ERROR_KIND, &body).await;
                    FolderReport {
                        folder: name,
                        outcome: MergeOutcome::MergeFailure {
                            error: format!("I/O error while listing files: {}", e),
                        },
                        diagnostic,
                    }
                }
            };

            self.log_port
                .log_event(
                    &LogEvent::new(LogLevel::Info, "Folder finished")
                        .with("folder", &report.folder)
                        .with("outcome", report.outcome.label()),
                )
                .await;
            summary.record(report);
        }

        summary.finish();
        self.log_port
            .info(&format!(
                "Batch finished: {} merged, {} already existed, {} invalid, {} failed",
                summary.successes(),
                summary.skipped_existing(),
                summary.skipped_invalid(),
                summary.failures()
            ))
            .await;
        Ok(summary)
    }

    /// Check the source is a readable directory and the output directory exists
    async fn preflight(
        &self,
        source_dir: &Path,
        output_dir: &Path,
    ) -> Result<(PathBuf, PathBuf), BatchError> {
        let source_unreadable = |message: String| BatchError::SourceUnreadable {
            path: source_dir.to_path_buf(),
            message,
        };

        let metadata = tokio::fs::metadata(source_dir)
            .await
            .map_err(|e| source_unreadable(e.to_string()))?;
        if !metadata.is_dir() {
            return Err(source_unreadable("not a directory".to_string()));
        }
        let _ = tokio::fs::read_dir(source_dir)
            .await
            .map_err(|e| source_unreadable(e.to_string()))?;
        let source = tokio::fs::canonicalize(source_dir)
            .await
            .map_err(|e| source_unreadable(e.to_string()))?;

        let output_uncreatable = |message: String| BatchError::OutputUncreatable {
            path: output_dir.to_path_buf(),
            message,
        };
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| output_uncreatable(e.to_string()))?;
        let output = tokio::fs::canonicalize(output_dir)
            .await
            .map_err(|e| output_uncreatable(e.to_string()))?;

        Ok((source, output))
    }

    /// Immediate subdirectories in name order, minus excluded ones
    async fn discover_folders(&self, source_dir: &Path) -> Vec<PathBuf> {
        let mut folders = Vec::new();
        let mut notes = Vec::new();

        let walker = WalkDir::new(source_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if DiscoveryRules::is_excluded(&name, &self.exclude_prefixes) {
                        notes.push(
                            LogEvent::new(LogLevel::Debug, "Skipping excluded folder")
                                .with("folder", name),
                        );
                    } else {
                        folders.push(entry.into_path());
                    }
                }
                Ok(_) => {}
                Err(e) => notes.push(
                    LogEvent::new(LogLevel::Warn, "Skipping unreadable entry in source directory")
                        .with("error", e),
                ),
            }
        }

        for note in &notes {
            self.log_port.log_event(note).await;
        }
        folders
    }

    /// List a folder's candidate parts and derive its output path.
    ///
    /// Unreadable entries without a video extension are skipped with a note;
    /// an unreadable video part fails the listing.
    fn build_task(
        &self,
        folder: &Path,
        output_dir: &Path,
        notes: &mut Vec<LogEvent>,
    ) -> Result<FolderTask, walkdir::Error> {
        let name = display_name(folder);
        let mut candidates = Vec::new();

        for entry in WalkDir::new(folder).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.path().and_then(ContainerKind::from_path).is_none() => {
                    notes.push(
                        LogEvent::new(LogLevel::Warn, "Skipping unreadable entry")
                            .with("folder", &name)
                            .with("error", &e),
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            if entry.file_type().is_file() && ContainerKind::from_path(entry.path()).is_some() {
                candidates.push(entry.into_path());
            }
        }

        PartSequencer::sort(&mut candidates, self.ordering);
        let output_path = DiscoveryRules::dominant_container(&candidates)
            .map(|kind| DiscoveryRules::output_path(output_dir, &name, kind));

        Ok(FolderTask {
            name,
            source_dir: folder.to_path_buf(),
            candidates,
            output_path,
        })
    }

    /// Drive one folder to its terminal outcome
    async fn process_folder(&self, task: FolderTask) -> FolderReport {
        self.log_port.info(SEPARATOR).await;
        self.log_port
            .info(&format!("Processing folder: {}", task.name))
            .await;

        if let Some(output_path) = &task.output_path {
            let exists = match tokio::fs::try_exists(output_path).await {
                Ok(exists) => exists,
                Err(e) => {
                    self.log_port
                        .error(&format!(
                            "Could not check output file {}: {}",
                            output_path.display(),
                            e
                        ))
                        .await;
                    let body = format!(
                        "Failed to check whether output exists: {}\n{}\n",
                        output_path.display(),
                        e
                    );
                    let diagnostic = self.write_diagnostic(&task.name, IO_ERROR_KIND, &body).await;
                    return self.report(
                        &task,
                        MergeOutcome::MergeFailure {
                            error: format!("I/O error while checking output: {}", e),
                        },
                        diagnostic,
                    );
                }
            };
            if exists {
                self.log_port
                    .info(&format!(
                        "Skipping {}: output file already exists: {}",
                        task.name,
                        display_name(output_path)
                    ))
                    .await;
                return self.report(
                    &task,
                    MergeOutcome::SkippedExisting {
                        output_path: output_path.clone(),
                    },
                    None,
                );
            }
        }

        self.log_port
            .info(&format!(
                "Found {} video part(s) in {}",
                task.candidates.len(),
                task.source_dir.display()
            ))
            .await;

        let parts = match self.validator.validate(task.candidates.clone()).await {
            ValidationVerdict::Mergeable(parts) => parts,
            ValidationVerdict::Rejected(rejection) => {
                self.log_port
                    .warn(&format!("Skipping {}: {}", task.name, rejection.reason))
                    .await;
                let kind = rejection.reason.diagnostic_kind();
                let diagnostic = self.write_diagnostic(&task.name, kind, &rejection.detail).await;
                return self.report(&task, MergeOutcome::SkippedInvalid(rejection), diagnostic);
            }
        };

        let Some(output_path) = task.output_path.clone() else {
            // Mergeable parts always carry a supported extension
            return self.report(
                &task,
                MergeOutcome::MergeFailure {
                    error: "could not determine output container".to_string(),
                },
                None,
            );
        };

        self.log_port
            .info(&format!(
                "All {} part(s) validated; merging into {}",
                parts.len(),
                display_name(&output_path)
            ))
            .await;

        match self.concat_port.concatenate(&parts, &output_path).await {
            Ok(()) => {
                self.log_port
                    .info(&format!("Successfully merged: {}", display_name(&output_path)))
                    .await;
                let expected = PartRules::total_duration(&parts);
                let audit = match self.auditor.audit(&output_path, expected).await {
                    Ok(result) => Some(result),
                    Err(e) => {
                        self.log_port
                            .warn(&format!(
                                "Could not verify duration of {}: {}",
                                display_name(&output_path),
                                e
                            ))
                            .await;
                        None
                    }
                };
                self.report(&task, MergeOutcome::Success { output_path, audit }, None)
            }
            Err(MergeError::OutputExists(path)) => {
                self.log_port
                    .warn(&format!(
                        "Output appeared before merge started, leaving it untouched: {}",
                        path.display()
                    ))
                    .await;
                self.report(&task, MergeOutcome::SkippedExisting { output_path: path }, None)
            }
            Err(e) => {
                self.log_port
                    .error(&format!("Error merging {}: {}", task.name, e))
                    .await;
                let diagnostic = self
                    .write_diagnostic(&task.name, "ffmpeg_error", &e.diagnostic_body())
                    .await;
                self.report(
                    &task,
                    MergeOutcome::MergeFailure {
                        error: e.to_string(),
                    },
                    diagnostic,
                )
            }
        }
    }

    async fn write_diagnostic(&self, folder: &str, kind: &str, body: &str) -> Option<PathBuf> {
        match self.diagnostics_port.write_diagnostic(folder, kind, body).await {
            Ok(path) => {
                self.log_port
                    .info(&format!("Details written to {}", path.display()))
                    .await;
                Some(path)
            }
            Err(e) => {
                self.log_port.warn(&e.to_string()).await;
                None
            }
        }
    }

    fn report(
        &self,
        task: &FolderTask,
        outcome: MergeOutcome,
        diagnostic: Option<PathBuf>,
    ) -> FolderReport {
        FolderReport {
            folder: task.name.clone(),
            outcome,
            diagnostic,
        }
    }
}
