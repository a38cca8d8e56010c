//! Project model: the unit of work tracking one compositing request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::settings::HologramSettings;
use crate::format::format_file_size;

/// Project lifecycle status. Transitions only move forward:
/// created -> processing -> {completed, failed}; a terminal project may be
/// re-claimed into processing by a new run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Created,
    Processing,
    Completed,
    Failed,
}

impl ProjectStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Failed)
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProjectStatus::Created => write!(f, "created"),
            ProjectStatus::Processing => write!(f, "processing"),
            ProjectStatus::Completed => write!(f, "completed"),
            ProjectStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ProjectStatus::Created),
            "processing" => Ok(ProjectStatus::Processing),
            "completed" => Ok(ProjectStatus::Completed),
            "failed" => Ok(ProjectStatus::Failed),
            other => Err(format!("unknown project status '{}'", other)),
        }
    }
}

/// Kind of the uploaded overlay asset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Video,
    Image,
}

impl OverlayKind {
    /// Classify an upload by its MIME type prefix.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let normalized = content_type.to_lowercase();
        if normalized.starts_with("video/") {
            Some(OverlayKind::Video)
        } else if normalized.starts_with("image/") {
            Some(OverlayKind::Image)
        } else {
            None
        }
    }
}

impl Display for OverlayKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OverlayKind::Video => write!(f, "video"),
            OverlayKind::Image => write!(f, "image"),
        }
    }
}

impl FromStr for OverlayKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(OverlayKind::Video),
            "image" => Ok(OverlayKind::Image),
            other => Err(format!("unknown overlay kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub base_video_path: Option<String>,
    pub base_video_filename: Option<String>,
    pub base_video_size: Option<i64>,
    pub overlay_media_path: Option<String>,
    pub overlay_media_filename: Option<String>,
    pub overlay_media_size: Option<i64>,
    pub overlay_media_kind: Option<OverlayKind>,
    pub settings: HologramSettings,
    pub status: ProjectStatus,
    pub processing_progress: f64,
    pub output_path: Option<String>,
    pub output_size: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            name,
            base_video_path: None,
            base_video_filename: None,
            base_video_size: None,
            overlay_media_path: None,
            overlay_media_filename: None,
            overlay_media_size: None,
            overlay_media_kind: None,
            settings: HologramSettings::default(),
            status: ProjectStatus::Created,
            processing_progress: 0.0,
            output_path: None,
            output_size: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Both source assets uploaded, so a processing run may start.
    pub fn ready_for_processing(&self) -> bool {
        self.base_video_path.is_some() && self.overlay_media_path.is_some()
    }

    /// Human-readable summary of the current lifecycle state.
    pub fn status_message(&self) -> String {
        match self.status {
            ProjectStatus::Created => "Project created, ready for processing".to_string(),
            ProjectStatus::Processing => {
                format!("Processing... {:.1}% complete", self.processing_progress)
            }
            ProjectStatus::Completed => {
                let size = self
                    .output_size
                    .map(|s| format_file_size(s.max(0) as u64))
                    .unwrap_or_else(|| "Unknown".to_string());
                format!("Processing completed! Output file size: {}", size)
            }
            ProjectStatus::Failed => {
                let err = self.error_message.as_deref().unwrap_or("Unknown error");
                format!("Processing failed: {}", err)
            }
        }
    }
}

/// Status read surface: what pollers see.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusReport {
    pub project_id: Uuid,
    pub status: ProjectStatus,
    pub progress: f64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&Project> for StatusReport {
    fn from(project: &Project) -> Self {
        StatusReport {
            project_id: project.id,
            status: project.status,
            progress: project.processing_progress,
            message: project.status_message(),
            error_message: project.error_message.clone(),
        }
    }
}

/// Response body for a successful upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadReceipt {
    pub message: String,
    pub filename: String,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<OverlayKind>,
    pub path: String,
}

/// Acknowledgment returned by the process operation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProcessAck {
    pub message: String,
    pub project_id: Uuid,
    pub settings: HologramSettings,
}

/// Service health and environment summary.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SystemStatus {
    pub message: String,
    pub ffmpeg_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg_version: Option<String>,
    pub uploads_directory: String,
    pub processed_directory: String,
    pub total_projects: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_starts_created() {
        let project = Project::new("Demo".to_string());
        assert_eq!(project.status, ProjectStatus::Created);
        assert_eq!(project.processing_progress, 0.0);
        assert!(!project.ready_for_processing());
        assert!(project.output_path.is_none());
        assert!(project.error_message.is_none());
    }

    #[test]
    fn test_ready_for_processing_requires_both_assets() {
        let mut project = Project::new("Demo".to_string());
        project.base_video_path = Some("uploads/base.mp4".to_string());
        assert!(!project.ready_for_processing());
        project.overlay_media_path = Some("uploads/holo.png".to_string());
        assert!(project.ready_for_processing());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            ProjectStatus::Created,
            ProjectStatus::Processing,
            ProjectStatus::Completed,
            ProjectStatus::Failed,
        ] {
            let parsed: ProjectStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("queued".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ProjectStatus::Created.is_terminal());
        assert!(!ProjectStatus::Processing.is_terminal());
        assert!(ProjectStatus::Completed.is_terminal());
        assert!(ProjectStatus::Failed.is_terminal());
    }

    #[test]
    fn test_overlay_kind_from_content_type() {
        assert_eq!(
            OverlayKind::from_content_type("video/mp4"),
            Some(OverlayKind::Video)
        );
        assert_eq!(
            OverlayKind::from_content_type("image/PNG"),
            Some(OverlayKind::Image)
        );
        assert_eq!(OverlayKind::from_content_type("audio/mpeg"), None);
    }

    #[test]
    fn test_status_message_created() {
        let project = Project::new("Demo".to_string());
        assert_eq!(
            project.status_message(),
            "Project created, ready for processing"
        );
    }

    #[test]
    fn test_status_message_processing_includes_progress() {
        let mut project = Project::new("Demo".to_string());
        project.status = ProjectStatus::Processing;
        project.processing_progress = 40.0;
        assert_eq!(project.status_message(), "Processing... 40.0% complete");
    }

    #[test]
    fn test_status_message_completed_formats_size() {
        let mut project = Project::new("Demo".to_string());
        project.status = ProjectStatus::Completed;
        project.output_size = Some(1_536_000);
        assert_eq!(
            project.status_message(),
            "Processing completed! Output file size: 1.5 MB"
        );
    }

    #[test]
    fn test_status_message_failed_includes_error() {
        let mut project = Project::new("Demo".to_string());
        project.status = ProjectStatus::Failed;
        project.error_message = Some("could not read input metadata".to_string());
        assert_eq!(
            project.status_message(),
            "Processing failed: could not read input metadata"
        );
    }

    #[test]
    fn test_status_report_from_project() {
        let mut project = Project::new("Demo".to_string());
        project.status = ProjectStatus::Failed;
        project.error_message = Some("boom".to_string());
        let report = StatusReport::from(&project);
        assert_eq!(report.project_id, project.id);
        assert_eq!(report.status, ProjectStatus::Failed);
        assert_eq!(report.error_message.as_deref(), Some("boom"));
        assert_eq!(report.message, "Processing failed: boom");
    }
}
