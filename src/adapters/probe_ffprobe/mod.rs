//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe` as a subprocess and reads the primary video stream's
//! resolution plus the container duration from its JSON output.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::adapters::process::ToolCommand;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<i64>,
    height: Option<i64>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    ffprobe: PathBuf,
    timeout: Duration,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(ffprobe: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe(&self, path: &Path) -> Result<MediaPart, ProbeError> {
        let target = tokio::fs::canonicalize(path)
            .await
            .unwrap_or_else(|_| path.to_path_buf());

        let output = ToolCommand::new(&self.ffprobe, self.timeout)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(target.as_os_str())
            .run()
            .await
            .map_err(|e| ProbeError::from_tool(path, e))?;

        let part = parse_probe_output(path, &output.stdout)?;
        debug!(
            "Probed {}: {} {:.3}s",
            part.file_name(),
            part.resolution,
            part.duration
        );
        Ok(part)
    }
}

/// Extract resolution and duration from ffprobe's JSON output
pub fn parse_probe_output(path: &Path, json: &[u8]) -> Result<MediaPart, ProbeError> {
    let unparsable = |message: String| ProbeError::UnparsableOutput {
        path: path.to_path_buf(),
        message,
    };

    let parsed: ProbeOutput = serde_json::from_slice(json)
        .map_err(|e| unparsable(format!("invalid ffprobe JSON: {}", e)))?;

    let video = parsed
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| unparsable("no video stream found".to_string()))?;

    let mut missing = Vec::new();
    if video.width.is_none() {
        missing.push("width");
    }
    if video.height.is_none() {
        missing.push("height");
    }

    let duration_text = parsed
        .format
        .as_ref()
        .and_then(|format| format.duration.as_deref())
        .or(video.duration.as_deref());
    if duration_text.is_none() {
        missing.push("duration");
    }

    let (Some(width), Some(height), Some(duration_text)) =
        (video.width, video.height, duration_text)
    else {
        return Err(unparsable(format!("missing metadata fields [{}]", missing.join(", "))));
    };

    if width <= 0 || height <= 0 {
        return Err(unparsable(format!(
            "invalid dimensions: width={}, height={}",
            width, height
        )));
    }

    let duration = duration_text
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| unparsable(format!("non-numeric duration '{}'", duration_text)))?;

    Ok(MediaPart::new(
        path,
        Resolution::new(width as u32, height as u32),
        duration,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            { "index": 0, "codec_type": "audio", "channels": 2 },
            { "index": 1, "codec_type": "video", "width": 1920, "height": 1080, "duration": "9.950000" }
        ],
        "format": { "filename": "part1.mp4", "duration": "10.000000" }
    }"#;

    #[test]
    fn test_parse_first_video_stream() {
        let part = parse_probe_output(Path::new("/src/Trip/part1.mp4"), SAMPLE.as_bytes()).unwrap();
        assert_eq!(part.resolution, Resolution::new(1920, 1080));
        assert!((part.duration - 10.0).abs() < 1e-9);
        assert_eq!(part.path, PathBuf::from("/src/Trip/part1.mp4"));
    }

    #[test]
    fn test_parse_falls_back_to_stream_duration() {
        let json = r#"{"streams":[{"codec_type":"video","width":640,"height":480,"duration":"3.5"}],"format":{}}"#;
        let part = parse_probe_output(Path::new("a.mkv"), json.as_bytes()).unwrap();
        assert!((part.duration - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_reports_missing_fields() {
        let json = r#"{"streams":[{"codec_type":"video","width":640}],"format":{}}"#;
        let err = parse_probe_output(Path::new("a.mkv"), json.as_bytes()).unwrap_err();
        match err {
            ProbeError::UnparsableOutput { message, .. } => {
                assert!(message.contains("height"));
                assert!(message.contains("duration"));
                assert!(!message.contains("width"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_audio_only() {
        let json = r#"{"streams":[{"codec_type":"audio"}],"format":{"duration":"1.0"}}"#;
        assert!(matches!(
            parse_probe_output(Path::new("a.mp4"), json.as_bytes()),
            Err(ProbeError::UnparsableOutput { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_probe_output(Path::new("a.mp4"), b"not json"),
            Err(ProbeError::UnparsableOutput { .. })
        ));
        let json = r#"{"streams":[{"codec_type":"video","width":1,"height":1}],"format":{"duration":"N/A"}}"#;
        assert!(parse_probe_output(Path::new("a.mp4"), json.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_keeps_zero_duration_for_validator() {
        let json = r#"{"streams":[{"codec_type":"video","width":1,"height":1}],"format":{"duration":"0.000000"}}"#;
        let part = parse_probe_output(Path::new("a.mp4"), json.as_bytes()).unwrap();
        assert_eq!(part.duration, 0.0);
    }
}
