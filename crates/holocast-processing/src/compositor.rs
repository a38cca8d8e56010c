//! External compositor - renders a filter graph with ffmpeg

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

use crate::filter_graph::FilterGraph;

/// Keep at most this much of ffmpeg's stderr as the stored diagnostic.
/// The useful error is at the end of the stream, so the head is dropped.
const MAX_DIAGNOSTIC_LEN: usize = 2000;

#[derive(Debug, Error)]
pub enum CompositorError {
    #[error("Invalid compositor configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to launch ffmpeg: {0}")]
    Launch(String),

    #[error("Video processing failed: {diagnostic}")]
    Failed {
        exit_code: Option<i32>,
        diagnostic: String,
    },
}

/// Boundary contract for the external compositing process.
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Render `graph` against the two inputs into `output_path`.
    /// The output file must only exist in a complete state on Ok.
    async fn run(
        &self,
        base_path: &Path,
        overlay_path: &Path,
        graph: &FilterGraph,
        output_path: &Path,
    ) -> Result<(), CompositorError>;

    /// Version string of the underlying tool, or None when it is not
    /// available. Used by health/precondition checks.
    async fn version(&self) -> Option<String>;
}

fn truncate_diagnostic(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() <= MAX_DIAGNOSTIC_LEN {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - MAX_DIAGNOSTIC_LEN;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    format!("... {}", &trimmed[start..])
}

/// ffmpeg-backed compositor.
pub struct FfmpegCompositor {
    ffmpeg_path: String,
}

impl FfmpegCompositor {
    pub fn new(ffmpeg_path: String) -> Result<Self, CompositorError> {
        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c)) {
            return Err(CompositorError::InvalidConfig(
                "Invalid ffmpeg_path: contains dangerous characters".to_string(),
            ));
        }
        Ok(Self { ffmpeg_path })
    }

    /// Build the full argument list. Arguments are passed as a structured
    /// list, never a shell string; numeric parameters were rendered by the
    /// graph builder from validated settings.
    fn build_args(
        base_path: &Path,
        overlay_path: &Path,
        graph: &FilterGraph,
        output_path: &Path,
    ) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            base_path.to_string_lossy().to_string(),
            "-i".to_string(),
            overlay_path.to_string_lossy().to_string(),
            "-filter_complex".to_string(),
            graph.to_filter_complex(),
            "-map".to_string(),
            format!("[{}]", graph.final_label),
            // Carry the base audio track through when one exists.
            "-map".to_string(),
            "0:a?".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "medium".to_string(),
            "-crf".to_string(),
            "23".to_string(),
            output_path.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Compositor for FfmpegCompositor {
    #[tracing::instrument(skip(self, graph), fields(
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "composite"
    ))]
    async fn run(
        &self,
        base_path: &Path,
        overlay_path: &Path,
        graph: &FilterGraph,
        output_path: &Path,
    ) -> Result<(), CompositorError> {
        let args = Self::build_args(base_path, overlay_path, graph, output_path);
        tracing::debug!(filter_complex = %graph.to_filter_complex(), "Invoking compositor");

        let start = std::time::Instant::now();
        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CompositorError::Launch(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CompositorError::Failed {
                exit_code: output.status.code(),
                diagnostic: truncate_diagnostic(&stderr),
            });
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output = %output_path.display(),
            "Compositing completed"
        );
        Ok(())
    }

    async fn version(&self) -> Option<String> {
        ffmpeg_version(&self.ffmpeg_path).await
    }
}

/// Parse the first line of `ffmpeg -version` output into a version string.
fn parse_version_output(stdout: &str) -> Option<String> {
    let line = stdout.lines().find(|l| l.starts_with("ffmpeg version"))?;
    line.split_whitespace().nth(2).map(|s| s.to_string())
}

/// Probe ffmpeg availability for the system status surface. Any failure
/// (missing binary, weird output) reads as "not available".
pub async fn ffmpeg_version(ffmpeg_path: &str) -> Option<String> {
    let output = Command::new(ffmpeg_path)
        .arg("-version")
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_version_output(&String::from_utf8_lossy(&output.stdout))
}
