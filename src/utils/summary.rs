//! End-of-run summary rendering

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::error::{MergeXError, MergeXResult};
use crate::utils::format_duration;

/// Output format of the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl SummaryFormat {
    /// Parse format name
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "text" => Ok(SummaryFormat::Text),
            "json" => Ok(SummaryFormat::Json),
            "yaml" => Ok(SummaryFormat::Yaml),
            other => Err(DomainError::BadArgs(format!(
                "Invalid summary format: {}. Valid formats: text, json, yaml",
                other
            ))),
        }
    }
}

/// Render a finished summary; `log_dir` is pointed to when diagnostics were written
pub fn render_summary(
    summary: &RunSummary,
    format: SummaryFormat,
    log_dir: &Path,
) -> MergeXResult<String> {
    match format {
        SummaryFormat::Text => Ok(render_text(summary, log_dir)),
        SummaryFormat::Json => serde_json::to_string_pretty(summary)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|e| MergeXError::Render {
                message: e.to_string(),
            }),
        SummaryFormat::Yaml => serde_yaml::to_string(summary).map_err(|e| MergeXError::Render {
            message: e.to_string(),
        }),
    }
}

fn render_text(summary: &RunSummary, log_dir: &Path) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "--- Video merging finished ---");
    let _ = writeln!(out, "Source: {}", summary.source_dir.display());
    let _ = writeln!(out, "Output: {}", summary.output_dir.display());
    if let Some(finished) = summary.finished_at {
        let elapsed = (finished - summary.started_at).to_std().unwrap_or_default();
        let _ = writeln!(out, "Elapsed: {}", format_duration(elapsed));
    }
    let _ = writeln!(out, "Folders processed: {}", summary.total());
    let _ = writeln!(out, "  Merged:                 {}", summary.successes());
    let _ = writeln!(out, "  Skipped (output exists): {}", summary.skipped_existing());
    let _ = writeln!(out, "  Skipped (invalid):      {}", summary.skipped_invalid());
    for reason in RejectReason::ALL {
        let count = summary.skipped_for(reason);
        if count > 0 {
            let _ = writeln!(out, "    {}: {}", reason, count);
        }
    }
    let _ = writeln!(out, "  Failed:                 {}", summary.failures());

    if !summary.reports.is_empty() {
        let _ = writeln!(out);
        for report in &summary.reports {
            let _ = writeln!(out, "{}: {}", report.folder, report.outcome.label());
        }
    }

    let drifted: Vec<&FolderReport> = summary
        .reports
        .iter()
        .filter(|report| report.outcome.has_drift_warning())
        .collect();
    if !drifted.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Duration warnings: {}", drifted.len());
        for report in drifted {
            if let MergeOutcome::Success {
                audit: Some(audit), ..
            } = &report.outcome
            {
                let _ = writeln!(
                    out,
                    "  {}: expected {:.2}s, got {:.2}s (diff {:.2}s)",
                    report.folder,
                    audit.expected_duration,
                    audit.actual_duration,
                    audit.delta_seconds
                );
            }
        }
    }

    let diagnostics: Vec<&Path> = summary.diagnostics().collect();
    let _ = writeln!(out);
    if diagnostics.is_empty() {
        let _ = writeln!(out, "No diagnostic log files were written.");
    } else {
        let _ = writeln!(
            out,
            "{} diagnostic log file(s) written, please review files in: {}",
            diagnostics.len(),
            log_dir.display()
        );
        for path in diagnostics {
            let _ = writeln!(out, "  {}", display_name(path));
        }
    }

    out
}
