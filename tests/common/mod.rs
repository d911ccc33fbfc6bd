//! Shared fixtures: in-memory ports and a temp directory layout

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use mergex_cli::adapters::FsDiagnosticsAdapter;
use mergex_cli::app::{AuditInteractor, BatchInteractor, ValidateInteractor};
use mergex_cli::domain::errors::*;
use mergex_cli::domain::model::*;
use mergex_cli::domain::rules::DurationTolerance;
use mergex_cli::ports::*;

/// Probe answering from a table keyed by file name
#[derive(Default)]
pub struct MockProbe {
    answers: Mutex<HashMap<String, Result<(Resolution, f64), String>>>,
    calls: Mutex<Vec<String>>,
}

impl MockProbe {
    pub fn with_part(self, name: &str, width: u32, height: u32, duration: f64) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(name.to_string(), Ok((Resolution::new(width, height), duration)));
        self
    }

    pub fn with_failure(self, name: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(name.to_string(), Err("moov atom not found".to_string()));
        self
    }

    /// File names probed so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProbePort for MockProbe {
    async fn probe(&self, path: &Path) -> Result<MediaPart, ProbeError> {
        let name = display_name(path);
        self.calls.lock().unwrap().push(name.clone());
        match self.answers.lock().unwrap().get(&name) {
            Some(Ok((resolution, duration))) => Ok(MediaPart::new(path, *resolution, *duration)),
            Some(Err(message)) => Err(ProbeError::ToolFailed {
                path: path.to_path_buf(),
                source: ToolError::NonZeroExit {
                    tool: "ffprobe".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: message.clone(),
                },
            }),
            None => Err(ProbeError::UnparsableOutput {
                path: path.to_path_buf(),
                message: "no video stream found".to_string(),
            }),
        }
    }
}

/// How the mock concatenator behaves
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ConcatBehavior {
    /// Create the output file
    #[default]
    Succeed,
    /// Fail with captured stderr and leave nothing behind
    Fail,
    /// Report that another writer created the output first
    LoseRace,
}

/// Concatenator that records manifests instead of running ffmpeg
#[derive(Default)]
pub struct MockConcat {
    behavior: ConcatBehavior,
    merges: Mutex<Vec<(Vec<String>, PathBuf)>>,
}

impl MockConcat {
    pub fn new(behavior: ConcatBehavior) -> Self {
        Self {
            behavior,
            merges: Mutex::new(Vec::new()),
        }
    }

    /// (part file names, output path) per call
    pub fn merges(&self) -> Vec<(Vec<String>, PathBuf)> {
        self.merges.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConcatPort for MockConcat {
    async fn concatenate(&self, parts: &[MediaPart], output_path: &Path) -> Result<(), MergeError> {
        self.merges.lock().unwrap().push((
            parts.iter().map(MediaPart::file_name).collect(),
            output_path.to_path_buf(),
        ));
        match self.behavior {
            ConcatBehavior::Succeed => {
                std::fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(output_path)?;
                Ok(())
            }
            ConcatBehavior::Fail => Err(MergeError::ToolFailed {
                reason: "ffmpeg exited with exit status: 1".to_string(),
                stderr: Some("Invalid data found when processing input\n".to_string()),
            }),
            ConcatBehavior::LoseRace => Err(MergeError::OutputExists(output_path.to_path_buf())),
        }
    }
}

/// Log port that keeps every message
#[derive(Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLog {
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }
}

#[async_trait]
impl LogPort for RecordingLog {
    async fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    async fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    async fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }

    async fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    async fn log_event(&self, event: &LogEvent) {
        self.push(event.level, &event.message);
    }
}

/// Temp source/output/log directories wired to mock ports
pub struct Harness {
    pub root: TempDir,
    pub probe: Arc<MockProbe>,
    pub concat: Arc<MockConcat>,
    pub log: Arc<RecordingLog>,
    pub batch: BatchInteractor,
}

impl Harness {
    pub fn new(probe: MockProbe, behavior: ConcatBehavior) -> Self {
        Self::with_ordering(probe, behavior, PartOrdering::Lexicographic)
    }

    pub fn with_ordering(
        probe: MockProbe,
        behavior: ConcatBehavior,
        ordering: PartOrdering,
    ) -> Self {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("source")).unwrap();

        let probe = Arc::new(probe);
        let concat = Arc::new(MockConcat::new(behavior));
        let log = Arc::new(RecordingLog::default());

        let validator = Arc::new(ValidateInteractor::new(
            Arc::clone(&probe) as Arc<dyn ProbePort>,
            Arc::clone(&log) as Arc<dyn LogPort>,
            ordering,
        ));
        let auditor = Arc::new(AuditInteractor::new(
            Arc::clone(&probe) as Arc<dyn ProbePort>,
            Arc::clone(&log) as Arc<dyn LogPort>,
            DurationTolerance::default(),
        ));
        let diagnostics = FsDiagnosticsAdapter::new(root.path().join("logs"));
        let batch = BatchInteractor::new(
            validator,
            auditor,
            Arc::clone(&concat) as Arc<dyn ConcatPort>,
            Arc::new(diagnostics) as Arc<dyn DiagnosticsPort>,
            Arc::clone(&log) as Arc<dyn LogPort>,
            ordering,
            vec!["_".to_string(), ".".to_string()],
        );

        Self {
            root,
            probe,
            concat,
            log,
            batch,
        }
    }

    pub fn source(&self) -> PathBuf {
        self.root.path().join("source")
    }

    pub fn output(&self) -> PathBuf {
        self.root.path().join("output")
    }

    pub fn logs(&self) -> PathBuf {
        self.root.path().join("logs")
    }

    /// Create empty files under `source/<folder>/`
    pub fn folder(&self, folder: &str, files: &[&str]) -> &Self {
        let dir = self.source().join(folder);
        std::fs::create_dir_all(&dir).unwrap();
        for file in files {
            std::fs::write(dir.join(file), b"").unwrap();
        }
        self
    }

    /// Create a file in the output directory
    pub fn existing_output(&self, name: &str) -> &Self {
        std::fs::create_dir_all(self.output()).unwrap();
        std::fs::write(self.output().join(name), b"merged earlier").unwrap();
        self
    }

    pub async fn run(&self) -> RunSummary {
        self.batch.run(&self.source(), &self.output()).await.unwrap()
    }
}
