//! CLI module for MergeX
//!
//! Loads configuration, asks for any missing paths, sets up logging, runs the
//! batch and prints the summary. There are no command-line arguments; settings
//! come from `mergex.toml` and `MERGEX_*` environment variables.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::adapters::{MergeXConfig, TomlConfigAdapter};
use crate::app::{AppContainer, DefaultAppContainer};
use crate::domain::model::RunSummary;
use crate::utils::{logging, summary};

pub mod prompt;

/// Exit status when the batch could not start
pub const EXIT_FATAL: u8 = 2;

/// Source and output directories for a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunPaths {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Take paths from configuration, prompting for whichever is missing
pub fn resolve_paths<R, W>(
    config: &MergeXConfig,
    input: &mut R,
    output: &mut W,
) -> Result<RunPaths>
where
    R: BufRead,
    W: Write,
{
    let source_dir = match &config.source_dir {
        Some(path) => path.clone(),
        None => prompt::ask_path(input, output, prompt::SOURCE_PROMPT)?,
    };
    let output_dir = match &config.output_dir {
        Some(path) => path.clone(),
        None => prompt::ask_path(input, output, prompt::OUTPUT_PROMPT)?,
    };
    Ok(RunPaths {
        source_dir,
        output_dir,
    })
}

/// 0 when every folder merged or was already done, 1 otherwise
pub fn exit_code(summary: &RunSummary) -> ExitCode {
    if summary.has_problems() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// Render the summary in the configured format and write it out
pub fn write_summary<W: Write>(
    summary: &RunSummary,
    config: &MergeXConfig,
    out: &mut W,
) -> Result<()> {
    let rendered = summary::render_summary(summary, config.summary_format, &config.log_dir)?;
    out.write_all(rendered.as_bytes())
        .and_then(|()| out.flush())
        .context("failed to write run summary")
}

/// Run one batch end to end.
///
/// Errors are returned only when the batch could not start; once folders have
/// been processed the summary decides the exit status.
pub async fn run() -> Result<RunSummary> {
    let adapter = TomlConfigAdapter::new();
    let config = adapter.load().context("failed to load configuration")?;

    let paths = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stderr();
        resolve_paths(&config, &mut input, &mut output)?
    };

    logging::init(&config)?;
    info!("--- Video merging started ---");
    match adapter.config_file_path() {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }
    let overrides = TomlConfigAdapter::env_overrides(|key| std::env::var(key).ok());
    if !overrides.is_empty() {
        info!("Environment overrides: {}", overrides.join(", "));
    }

    let container = DefaultAppContainer::new(&config)?;
    info!("Using ffmpeg: {}", container.toolchain().ffmpeg.display());
    info!("Using ffprobe: {}", container.toolchain().ffprobe.display());
    info!("Main video source path: {}", paths.source_dir.display());
    info!("Output path for merged videos: {}", paths.output_dir.display());
    info!("Log directory: {}", config.log_dir.display());

    let summary = container
        .batch_interactor()
        .run(&paths.source_dir, &paths.output_dir)
        .await?;

    if let Err(e) = write_summary(&summary, &config, &mut std::io::stdout().lock()) {
        error!("Could not print run summary: {:#}", e);
        eprintln!("error: could not print run summary: {:#}", e);
    }

    Ok(summary)
}
