// Toolchain adapter - Locates ffmpeg and ffprobe on the search path

use std::path::PathBuf;

use tracing::debug;

use crate::domain::errors::BatchError;

/// Resolved locations of the external media tools
#[derive(Debug, Clone, PartialEq)]
pub struct Toolchain {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Toolchain {
    /// Resolve both tools once at startup.
    ///
    /// Accepts bare names (searched on `PATH`) or explicit paths.
    pub fn locate(ffmpeg: &str, ffprobe: &str) -> Result<Self, BatchError> {
        let ffmpeg = Self::resolve(ffmpeg)?;
        let ffprobe = Self::resolve(ffprobe)?;
        Ok(Self { ffmpeg, ffprobe })
    }

    fn resolve(tool: &str) -> Result<PathBuf, BatchError> {
        match which::which(tool) {
            Ok(path) => {
                debug!("Found dependency: {} -> {}", tool, path.display());
                Ok(path)
            }
            Err(e) => Err(BatchError::ToolMissing {
                tool: tool.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_fatal() {
        let err = Toolchain::locate("mergex-missing-ffmpeg", "mergex-missing-ffprobe").unwrap_err();
        match err {
            BatchError::ToolMissing { tool, .. } => assert_eq!(tool, "mergex-missing-ffmpeg"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
