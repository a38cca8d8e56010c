//! Media inspection - stream metadata via ffprobe

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Invalid media path: {0}")]
    InvalidPath(String),

    #[error("Failed to launch ffprobe: {0}")]
    Launch(String),

    #[error("ffprobe failed: {0}")]
    Failed(String),

    #[error("Malformed probe output: {0}")]
    Malformed(String),

    #[error("No video stream found")]
    NoVideoStream,
}

/// Stream metadata extracted from a media file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    pub duration: Option<f64>,
    pub codec: Option<String>,
}

/// Boundary contract for media inspection; the production implementation
/// shells out to ffprobe, tests substitute their own.
#[async_trait]
pub trait MediaInspector: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError>;
}

/// Reject paths containing shell metacharacters or traversal sequences.
/// Arguments are never passed through a shell, but media paths come from
/// our own vault and anything outside that shape is a bug upstream.
fn validate_path(path: &Path) -> Result<(), ProbeError> {
    let raw = path.to_string_lossy();
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if raw.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProbeError::InvalidPath(format!(
            "Path contains dangerous characters: {}",
            raw
        )));
    }
    if raw.contains("..") {
        return Err(ProbeError::InvalidPath(format!(
            "Path contains directory traversal: {}",
            raw
        )));
    }
    Ok(())
}

/// ffprobe-backed media inspector.
pub struct FfprobeInspector {
    ffprobe_path: String,
}

impl FfprobeInspector {
    pub fn new(ffprobe_path: String) -> Result<Self, ProbeError> {
        if !ffprobe_path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        }) {
            return Err(ProbeError::InvalidPath(
                "Invalid ffprobe_path: contains unsafe characters".to_string(),
            ));
        }
        Ok(Self { ffprobe_path })
    }
}

/// Parse ffprobe JSON output into MediaInfo. Split out of the subprocess
/// call so the parsing is testable without ffprobe installed.
fn parse_probe_output(stdout: &[u8]) -> Result<MediaInfo, ProbeError> {
    let probe_data: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| ProbeError::Malformed(format!("Failed to parse ffprobe output: {}", e)))?;

    let stream = probe_data["streams"]
        .get(0)
        .ok_or(ProbeError::NoVideoStream)?;

    let width = stream["width"]
        .as_u64()
        .ok_or_else(|| ProbeError::Malformed("Could not parse width".to_string()))?
        as u32;
    let height = stream["height"]
        .as_u64()
        .ok_or_else(|| ProbeError::Malformed("Could not parse height".to_string()))?
        as u32;

    if width == 0 || height == 0 {
        return Err(ProbeError::Malformed(format!(
            "Stream reports degenerate dimensions {}x{}",
            width, height
        )));
    }

    let duration = probe_data["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok());
    let codec = stream["codec_name"].as_str().map(|s| s.to_string());

    Ok(MediaInfo {
        width,
        height,
        duration,
        codec,
    })
}

#[async_trait]
impl MediaInspector for FfprobeInspector {
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        validate_path(path)?;

        let start = std::time::Instant::now();
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| ProbeError::Launch(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(ProbeError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let info = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = info.width,
            height = info.height,
            codec = info.codec.as_deref().unwrap_or("unknown"),
            "Media probe completed"
        );

        Ok(info)
    }
}
