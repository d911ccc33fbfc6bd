//! FFmpeg execution adapter
//!
//! Concatenates parts with ffmpeg's concat demuxer in stream-copy mode. The
//! manifest lives in a scoped temporary file and the output path is claimed
//! before ffmpeg starts, so an existing file is never overwritten and a failed
//! merge leaves nothing behind.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::{Builder as TempFileBuilder, NamedTempFile};
use tracing::{debug, info, warn};

use crate::adapters::process::ToolCommand;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Ordered list of input files in concat demuxer syntax
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatManifest {
    entries: Vec<PathBuf>,
}

impl ConcatManifest {
    /// Build a manifest from parts, keeping their order
    pub fn from_parts(parts: &[MediaPart]) -> Result<Self, MergeError> {
        let entries = parts
            .iter()
            .map(|part| absolute_path(&part.path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Files in manifest order
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// One `file '<path>'` line per entry
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|path| format!("file '{}'\n", escape_concat_path(path)))
            .collect()
    }

    /// Write the manifest to a fresh exclusive temp file, removed on drop
    pub fn write_temp(&self, dir: Option<&Path>, label: &str) -> Result<NamedTempFile, MergeError> {
        let prefix = format!("{}_ffmpeg_list_", label);
        let mut builder = TempFileBuilder::new();
        builder.prefix(&prefix).suffix(".txt");
        let mut file = match dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempfile_in(dir)?
            }
            None => builder.tempfile()?,
        };
        file.write_all(self.render().as_bytes())?;
        file.flush()?;
        debug!("Generated temporary file list for ffmpeg: {}", file.path().display());
        Ok(file)
    }
}

/// Quote a path for a concat manifest line
pub fn escape_concat_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    let text = if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    };
    text.replace('\'', r"'\''")
}

fn absolute_path(path: &Path) -> Result<PathBuf, MergeError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Exclusive claim on an output path.
///
/// Dropping an uncommitted claim removes whatever was written to the path.
#[derive(Debug)]
pub struct OutputClaim {
    path: PathBuf,
    committed: bool,
}

impl OutputClaim {
    /// Create the output file exclusively; fails if it already exists
    pub fn acquire(path: &Path) -> Result<Self, MergeError> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => Ok(Self {
                path: path.to_path_buf(),
                committed: false,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(MergeError::OutputExists(path.to_path_buf()))
            }
            Err(e) => Err(MergeError::Io(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the output
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for OutputClaim {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!(
                "Deleted incomplete output file due to merge error: {}",
                display_name(&self.path)
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Could not delete incomplete output file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// FFmpeg-based concatenation adapter
pub struct FFmpegAdapter {
    ffmpeg: PathBuf,
    timeout: Duration,
    temp_dir: Option<PathBuf>,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(ffmpeg: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            timeout,
            temp_dir: None,
        }
    }

    /// Place manifests in a specific directory instead of the system temp dir
    pub fn with_temp_dir(mut self, temp_dir: Option<PathBuf>) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    fn concat_command(&self, manifest: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(&self.ffmpeg, self.timeout)
            .args(["-hide_banner", "-nostdin", "-v", "error", "-f", "concat", "-safe", "0", "-i"])
            .arg(manifest.as_os_str())
            .args(["-c", "copy", "-y"])
            .arg(output.as_os_str())
    }
}

#[async_trait]
impl ConcatPort for FFmpegAdapter {
    async fn concatenate(&self, parts: &[MediaPart], output_path: &Path) -> Result<(), MergeError> {
        let label = output_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "merge".to_string());

        let manifest = ConcatManifest::from_parts(parts)?;
        let list_file = manifest.write_temp(self.temp_dir.as_deref(), &label)?;
        let claim = OutputClaim::acquire(output_path)?;

        let result = self
            .concat_command(list_file.path(), claim.path())
            .run()
            .await;

        if let Err(e) = list_file.close() {
            warn!("Could not delete temporary file list: {}", e);
        }

        match result {
            Ok(_) => {
                claim.commit();
                Ok(())
            }
            Err(e) => Err(MergeError::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn part(path: &str) -> MediaPart {
        MediaPart::new(path, Resolution::new(1920, 1080), 10.0)
    }

    #[test]
    fn test_manifest_preserves_order() {
        let parts = vec![part("/src/Trip/part1.mp4"), part("/src/Trip/part2.mp4")];
        let manifest = ConcatManifest::from_parts(&parts).unwrap();
        assert_eq!(
            manifest.render(),
            "file '/src/Trip/part1.mp4'\nfile '/src/Trip/part2.mp4'\n"
        );
    }

    #[test]
    fn test_manifest_escapes_single_quotes() {
        let escaped = escape_concat_path(Path::new("/src/Bob's Trip/a.mp4"));
        assert_eq!(escaped, r"/src/Bob'\''s Trip/a.mp4");
    }

    #[test]
    fn test_manifest_makes_paths_absolute() {
        let manifest = ConcatManifest::from_parts(&[part("relative/a.mp4")]).unwrap();
        assert!(manifest.entries()[0].is_absolute());
    }

    #[test]
    fn test_manifest_temp_file_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let manifest = ConcatManifest::from_parts(&[part("/src/a.mp4")]).unwrap();
        let file = manifest.write_temp(Some(dir.path()), "Trip").unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());
        assert!(display_name(&path).starts_with("Trip_ffmpeg_list_"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), manifest.render());
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_claim_refuses_existing_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("Done.mp4");
        std::fs::write(&output, b"merged").unwrap();

        let err = OutputClaim::acquire(&output).unwrap_err();
        assert!(matches!(err, MergeError::OutputExists(_)));
        assert_eq!(std::fs::read(&output).unwrap(), b"merged");
    }

    #[test]
    fn test_uncommitted_claim_removes_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("Trip.mp4");

        let claim = OutputClaim::acquire(&output).unwrap();
        std::fs::write(&output, b"partial").unwrap();
        drop(claim);
        assert!(!output.exists());

        let claim = OutputClaim::acquire(&output).unwrap();
        claim.commit();
        assert!(output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_merge_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("Trip.mp4");
        // `false` ignores its arguments and exits 1
        let adapter = FFmpegAdapter::new("false", Duration::from_secs(5))
            .with_temp_dir(Some(dir.path().join("tmp")));

        let err = adapter
            .concatenate(&[part("/src/Trip/part1.mp4")], &output)
            .await
            .unwrap_err();

        assert!(matches!(err, MergeError::ToolFailed { .. }));
        assert!(!output.exists());
        let leftovers = std::fs::read_dir(dir.path().join("tmp")).unwrap().count();
        assert_eq!(leftovers, 0);
    }
}
