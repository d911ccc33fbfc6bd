// Domain rules - Business logic and policies

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::model::*;

/// Rules for sequencing parts before concatenation
pub struct PartSequencer;

impl PartSequencer {
    /// Sort candidate files into merge order by file name (stable)
    pub fn sort(paths: &mut [PathBuf], ordering: PartOrdering) {
        paths.sort_by(|a, b| Self::compare(a, b, ordering));
    }

    /// Compare two paths by file name under the given ordering
    pub fn compare(a: &Path, b: &Path, ordering: PartOrdering) -> Ordering {
        let (name_a, name_b) = (a.file_name(), b.file_name());
        match ordering {
            PartOrdering::Lexicographic => name_a.cmp(&name_b),
            PartOrdering::Natural => {
                let lossy_a = name_a.map(|n| n.to_string_lossy()).unwrap_or_default();
                let lossy_b = name_b.map(|n| n.to_string_lossy()).unwrap_or_default();
                natural_cmp(&lossy_a, &lossy_b).then_with(|| name_a.cmp(&name_b))
            }
        }
    }
}

/// Compare strings treating runs of ASCII digits as numbers
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let run_a = take_digits(&mut left);
                let run_b = take_digits(&mut right);
                let ordering = compare_digit_runs(&run_a, &run_b);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits<I>(chars: &mut std::iter::Peekable<I>) -> String
where
    I: Iterator<Item = char>,
{
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let trimmed_a = a.trim_start_matches('0');
    let trimmed_b = b.trim_start_matches('0');
    trimmed_a
        .len()
        .cmp(&trimmed_b.len())
        .then_with(|| trimmed_a.cmp(trimmed_b))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Consistency rules applied to a fully probed folder
pub struct PartRules;

impl PartRules {
    /// Every part must have a strictly positive duration
    pub fn check_durations(parts: &[MediaPart]) -> Result<(), Rejection> {
        match parts.iter().find(|part| part.duration <= 0.0) {
            Some(part) => Err(Rejection::new(
                RejectReason::NonPositiveDuration,
                format!(
                    "Video part has zero or negative duration: {} ({:.3}s)\nPath: {}\n",
                    part.file_name(),
                    part.duration,
                    part.path.display()
                ),
            )),
            None => Ok(()),
        }
    }

    /// Every part must match the first part's resolution
    pub fn check_resolutions(parts: &[MediaPart]) -> Result<(), Rejection> {
        let Some(reference) = parts.first() else {
            return Ok(());
        };

        match parts
            .iter()
            .find(|part| part.resolution != reference.resolution)
        {
            Some(mismatch) => Err(Rejection::new(
                RejectReason::ResolutionMismatch,
                format!(
                    "Reference video ({}): {}\nMismatch video ({}): {}\nMismatch file path: {}\n",
                    reference.file_name(),
                    reference.resolution,
                    mismatch.file_name(),
                    mismatch.resolution,
                    mismatch.path.display()
                ),
            )),
            None => Ok(()),
        }
    }

    /// Sum of part durations in seconds
    pub fn total_duration(parts: &[MediaPart]) -> f64 {
        parts.iter().map(|part| part.duration).sum()
    }
}

/// Rules deciding which folders and files take part in a batch
pub struct DiscoveryRules;

impl DiscoveryRules {
    /// Folder names starting with an exclusion marker are ignored
    pub fn is_excluded(folder_name: &str, exclude_prefixes: &[String]) -> bool {
        exclude_prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .any(|prefix| folder_name.starts_with(prefix.as_str()))
    }

    /// Most frequent container among candidates; ties go to the earliest candidate
    pub fn dominant_container(candidates: &[PathBuf]) -> Option<ContainerKind> {
        let kinds: Vec<ContainerKind> = candidates
            .iter()
            .filter_map(|path| ContainerKind::from_path(path))
            .collect();

        let mut counts: HashMap<ContainerKind, usize> = HashMap::new();
        for kind in &kinds {
            *counts.entry(*kind).or_default() += 1;
        }

        let best = counts.values().copied().max()?;
        kinds.into_iter().find(|kind| counts[kind] == best)
    }

    /// `output_dir/<folder>.<ext>`
    pub fn output_path(output_dir: &Path, folder_name: &str, kind: ContainerKind) -> PathBuf {
        output_dir.join(format!("{}.{}", folder_name, kind.extension()))
    }
}

/// Allowed drift between a merged file and the sum of its parts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationTolerance {
    /// Floor in seconds, dominant for short videos
    pub absolute_secs: f64,
    /// Fraction of the expected duration, dominant for long videos
    pub ratio: f64,
}

impl Default for DurationTolerance {
    fn default() -> Self {
        Self {
            absolute_secs: 5.0,
            ratio: 0.02,
        }
    }
}

impl DurationTolerance {
    /// Maximum allowed delta for an expected duration
    pub fn allowed(&self, expected: f64) -> f64 {
        self.absolute_secs.max(expected.abs() * self.ratio)
    }

    /// Compare actual against expected
    pub fn evaluate(&self, expected: f64, actual: f64) -> AuditResult {
        let delta_seconds = (actual - expected).abs();
        let tolerance_seconds = self.allowed(expected);
        AuditResult {
            expected_duration: expected,
            actual_duration: actual,
            delta_seconds,
            tolerance_seconds,
            within_tolerance: delta_seconds <= tolerance_seconds,
        }
    }
}
