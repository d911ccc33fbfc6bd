//! Subprocess execution with a hard timeout
//!
//! Every external tool call goes through [`ToolCommand`], so each invocation is a
//! fallible operation returning a tagged [`ToolError`] and is killed if it
//! outlives its timeout.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::ToolError;

/// Captured output of a successful tool run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// A single external tool invocation
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a command for the given executable
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Short tool name used in errors
    pub fn tool_name(&self) -> String {
        tool_name(&self.program)
    }

    /// Shell-like rendering for debug logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| {
                let text = part.to_string_lossy();
                if text.contains(char::is_whitespace) {
                    format!("\"{}\"", text)
                } else {
                    text.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion, capturing stdout and stderr.
    ///
    /// The child is killed if the timeout elapses first.
    pub async fn run(&self) -> Result<ToolOutput, ToolError> {
        let tool = self.tool_name();
        debug!(command = %self.display(), "Running command");

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ToolError::NotFound {
                        tool: tool.clone(),
                        message: format!("{} ({})", self.program.display(), e),
                    }
                } else {
                    ToolError::SpawnFailed {
                        tool: tool.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolError::SpawnFailed {
                    tool,
                    message: format!("failed waiting for process: {}", e),
                })
            }
            Err(_) => {
                return Err(ToolError::TimedOut {
                    tool,
                    timeout: self.timeout,
                })
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            debug!(tool = %tool, "Command stderr:\n{}", stderr);
        }

        if !output.status.success() {
            return Err(ToolError::NonZeroExit {
                tool,
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(ToolOutput {
            stdout: output.stdout,
            stderr,
        })
    }
}

/// File name of an executable path
pub fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let err = ToolCommand::new("mergex-definitely-missing-tool", Duration::from_secs(5))
            .arg("-version")
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_non_zero_exit_captures_stderr() {
        let err = ToolCommand::new("sh", Duration::from_secs(5))
            .args(["-c", "echo boom >&2; exit 3"])
            .run()
            .await
            .unwrap_err();
        match err {
            ToolError::NonZeroExit { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let err = ToolCommand::new("sleep", Duration::from_millis(200))
            .arg("5")
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::TimedOut { .. }));
    }

    #[tokio::test]
    async fn test_success_returns_stdout() {
        let output = ToolCommand::new("sh", Duration::from_secs(5))
            .args(["-c", "printf hello"])
            .run()
            .await
            .unwrap();
        assert_eq!(output.stdout, b"hello");
    }

    #[test]
    fn test_display_quotes_whitespace() {
        let cmd = ToolCommand::new("ffmpeg", Duration::from_secs(1)).args(["-i", "my file.mp4"]);
        assert_eq!(cmd.display(), "ffmpeg -i \"my file.mp4\"");
    }
}
