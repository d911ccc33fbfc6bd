//! MergeX batch video merger
//!
//! Merges the parts found in each subfolder of a source directory into one
//! file per folder, using ffmpeg's concat demuxer without re-encoding.
//!
//! # Usage
//!
//! ```bash
//! MERGEX_SOURCE_DIR=/videos/raw MERGEX_OUTPUT_DIR=/videos/merged mergex
//! mergex   # prompts for both paths
//! ```

use std::process::ExitCode;

use mergex_cli::cli;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(summary) => cli::exit_code(&summary),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("fatal: {:#}", e);
            ExitCode::from(cli::EXIT_FATAL)
        }
    }
}
