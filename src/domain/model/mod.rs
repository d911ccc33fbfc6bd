// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Frame size of a video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Create a new resolution
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One probed segment of a logical video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaPart {
    pub path: PathBuf,
    pub resolution: Resolution,
    /// Duration in seconds
    pub duration: f64,
}

impl MediaPart {
    /// Create a new media part
    pub fn new(path: impl Into<PathBuf>, resolution: Resolution, duration: f64) -> Self {
        Self {
            path: path.into(),
            resolution,
            duration,
        }
    }

    /// File name for log and diagnostic output
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }
}

/// Supported container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Mp4,
    Mkv,
}

impl ContainerKind {
    /// All supported containers
    pub const ALL: [ContainerKind; 2] = [ContainerKind::Mp4, ContainerKind::Mkv];

    /// Parse a file extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| ext.eq_ignore_ascii_case(kind.extension()))
    }

    /// Container implied by a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Lowercase extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerKind::Mp4 => "mp4",
            ContainerKind::Mkv => "mkv",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How parts are sequenced before concatenation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOrdering {
    /// Byte-wise file name order
    #[default]
    Lexicographic,
    /// Digit runs compared numerically, so `part2` sorts before `part10`
    Natural,
}

impl PartOrdering {
    /// Parse ordering name
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "lexicographic" => Ok(PartOrdering::Lexicographic),
            "natural" => Ok(PartOrdering::Natural),
            other => Err(DomainError::BadArgs(format!(
                "Invalid part ordering: {}. Valid values: lexicographic, natural",
                other
            ))),
        }
    }
}

/// One unit of batch work: a subdirectory and its candidate parts
#[derive(Debug, Clone)]
pub struct FolderTask {
    pub name: String,
    pub source_dir: PathBuf,
    pub candidates: Vec<PathBuf>,
    /// `None` when the folder has no candidates to derive an extension from
    pub output_path: Option<PathBuf>,
}

/// Why a folder was judged unmergeable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    NoVideoFiles,
    ResolutionMismatch,
    NonPositiveDuration,
    ProbeFailure,
}

impl RejectReason {
    /// All reasons, in summary order
    pub const ALL: [RejectReason; 4] = [
        RejectReason::NoVideoFiles,
        RejectReason::ResolutionMismatch,
        RejectReason::NonPositiveDuration,
        RejectReason::ProbeFailure,
    ];

    /// Stable label used in summaries
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::NoVideoFiles => "no-video-files",
            RejectReason::ResolutionMismatch => "resolution-mismatch",
            RejectReason::NonPositiveDuration => "non-positive-duration",
            RejectReason::ProbeFailure => "probe-failure",
        }
    }

    /// Suffix of the per-folder diagnostic file
    pub fn diagnostic_kind(&self) -> &'static str {
        match self {
            RejectReason::NoVideoFiles => "no_video_files",
            RejectReason::ResolutionMismatch => "resolution_mismatch",
            RejectReason::NonPositiveDuration => "non_positive_duration",
            RejectReason::ProbeFailure => "metadata_error",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A rejection reason with human-readable details
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub reason: RejectReason,
    pub detail: String,
}

impl Rejection {
    /// Create a new rejection
    pub fn new(reason: RejectReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Result of validating a folder's candidates
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationVerdict {
    /// Parts in merge order
    Mergeable(Vec<MediaPart>),
    Rejected(Rejection),
}

impl ValidationVerdict {
    /// Shorthand for a rejected verdict
    pub fn rejected(reason: RejectReason, detail: impl Into<String>) -> Self {
        ValidationVerdict::Rejected(Rejection::new(reason, detail))
    }
}

/// Comparison of a merged file's duration against its parts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AuditResult {
    pub expected_duration: f64,
    pub actual_duration: f64,
    /// Always `|actual - expected|`
    pub delta_seconds: f64,
    pub tolerance_seconds: f64,
    pub within_tolerance: bool,
}

/// Terminal state of one folder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MergeOutcome {
    Success {
        output_path: PathBuf,
        /// `None` when the merged file could not be re-probed
        audit: Option<AuditResult>,
    },
    SkippedExisting {
        output_path: PathBuf,
    },
    SkippedInvalid(Rejection),
    MergeFailure {
        error: String,
    },
}

impl MergeOutcome {
    /// Short label for summary lines
    pub fn label(&self) -> String {
        match self {
            MergeOutcome::Success { audit, .. } => match audit {
                Some(audit) if !audit.within_tolerance => "success (duration drift)".to_string(),
                _ => "success".to_string(),
            },
            MergeOutcome::SkippedExisting { .. } => "skipped (output exists)".to_string(),
            MergeOutcome::SkippedInvalid(rejection) => format!("skipped ({})", rejection.reason),
            MergeOutcome::MergeFailure { .. } => "merge failure".to_string(),
        }
    }

    /// Whether the merged duration drifted beyond tolerance
    pub fn has_drift_warning(&self) -> bool {
        matches!(
            self,
            MergeOutcome::Success {
                audit: Some(AuditResult {
                    within_tolerance: false,
                    ..
                }),
                ..
            }
        )
    }
}

/// Outcome of one folder, with its diagnostic artifact if one was written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderReport {
    pub folder: String,
    pub outcome: MergeOutcome,
    pub diagnostic: Option<PathBuf>,
}

/// Append-only record of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub reports: Vec<FolderReport>,
}

impl RunSummary {
    /// Start an empty summary
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            started_at: Local::now(),
            finished_at: None,
            reports: Vec::new(),
        }
    }

    /// Append a folder's terminal outcome
    pub fn record(&mut self, report: FolderReport) {
        self.reports.push(report);
    }

    /// Mark the batch complete
    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn successes(&self) -> usize {
        self.count(|outcome| matches!(outcome, MergeOutcome::Success { .. }))
    }

    pub fn skipped_existing(&self) -> usize {
        self.count(|outcome| matches!(outcome, MergeOutcome::SkippedExisting { .. }))
    }

    pub fn skipped_invalid(&self) -> usize {
        self.count(|outcome| matches!(outcome, MergeOutcome::SkippedInvalid(_)))
    }

    /// Invalid folders rejected for one specific reason
    pub fn skipped_for(&self, reason: RejectReason) -> usize {
        self.count(|outcome| {
            matches!(outcome, MergeOutcome::SkippedInvalid(rejection) if rejection.reason == reason)
        })
    }

    pub fn failures(&self) -> usize {
        self.count(|outcome| matches!(outcome, MergeOutcome::MergeFailure { .. }))
    }

    pub fn drift_warnings(&self) -> usize {
        self.count(MergeOutcome::has_drift_warning)
    }

    /// Diagnostic files written during the run
    pub fn diagnostics(&self) -> impl Iterator<Item = &Path> {
        self.reports
            .iter()
            .filter_map(|report| report.diagnostic.as_deref())
    }

    /// Report for a folder, if it was processed
    pub fn report_for(&self, folder: &str) -> Option<&FolderReport> {
        self.reports.iter().find(|report| report.folder == folder)
    }

    /// True when any folder was rejected or failed
    pub fn has_problems(&self) -> bool {
        self.skipped_invalid() > 0 || self.failures() > 0
    }

    fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&MergeOutcome) -> bool,
    {
        self.reports
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }
}

/// Last path component, lossily converted
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
