// Filesystem diagnostics adapter - Per-folder failure artifacts in the log directory

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::ports::*;

/// Writes `<folder>_<kind>.log` files next to the run log
pub struct FsDiagnosticsAdapter {
    log_dir: PathBuf,
}

impl FsDiagnosticsAdapter {
    /// Create new diagnostics adapter rooted at `log_dir`
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    /// Path the diagnostic for a folder and kind is written to
    pub fn diagnostic_path(&self, folder: &str, kind: &str) -> PathBuf {
        self.log_dir.join(format!("{}_{}.log", folder, kind))
    }
}

#[async_trait]
impl DiagnosticsPort for FsDiagnosticsAdapter {
    async fn write_diagnostic(
        &self,
        folder: &str,
        kind: &str,
        body: &str,
    ) -> Result<PathBuf, DomainError> {
        tokio::fs::create_dir_all(&self.log_dir).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create log directory {}: {}",
                self.log_dir.display(),
                e
            ))
        })?;

        let path = self.diagnostic_path(folder, kind);
        tokio::fs::write(&path, body).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Could not write diagnostic log to {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_writes_named_diagnostic() {
        let dir = TempDir::new().unwrap();
        let adapter = FsDiagnosticsAdapter::new(dir.path().join("logs"));

        let path = adapter
            .write_diagnostic("Bad", "resolution_mismatch", "1920x1080 vs 1280x720\n")
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("logs").join("Bad_resolution_mismatch.log"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "1920x1080 vs 1280x720\n"
        );
    }
}
