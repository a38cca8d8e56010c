//! Download endpoint: streams the rendered output of a completed project.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::Response,
};
use holocast_core::models::ProjectStatus;
use holocast_core::AppError;
use holocast_storage::StorageError;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Attachment name: project name with spaces collapsed plus a short id,
/// e.g. `hologram_My_Scene_1a2b3c4d.mp4`.
fn download_filename(name: &str, id: Uuid) -> String {
    let safe_name: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let id_str = id.to_string();
    format!("hologram_{}_{}.mp4", safe_name, &id_str[..8])
}

#[utoipa::path(
    get,
    path = "/api/v0/projects/{id}/download",
    tag = "processing",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "The rendered video", content_type = "video/mp4"),
        (status = 400, description = "Project is not completed", body = ErrorResponse),
        (status = 404, description = "Project or output file not found", body = ErrorResponse)
    )
)]
pub async fn download_output(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, HttpAppError> {
    let project = state
        .store
        .get(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    if project.status != ProjectStatus::Completed {
        return Err(AppError::BadRequest(format!(
            "Video is not ready for download. Current status: {}",
            project.status
        ))
        .into());
    }

    let output_path = project
        .output_path
        .as_deref()
        .ok_or_else(|| AppError::NotFound("Output file path not found".to_string()))?;

    let file = state
        .vault
        .open_for_read(std::path::Path::new(output_path))
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) => HttpAppError(AppError::NotFound(
                "Processed video file not found on disk".to_string(),
            )),
            other => HttpAppError::from(other),
        })?;

    let body = Body::from_stream(ReaderStream::new(file));
    let filename = download_filename(&project.name, project.id);

    Response::builder()
        .header(CONTENT_TYPE, "video/mp4")
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(body)
        .map_err(|e| HttpAppError(AppError::Internal(format!("Failed to build response: {}", e))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_filename_sanitizes_name() {
        let id = Uuid::parse_str("1a2b3c4d-0000-0000-0000-000000000000").unwrap();
        assert_eq!(
            download_filename("My Scene", id),
            "hologram_My_Scene_1a2b3c4d.mp4"
        );
        assert_eq!(
            download_filename("a/b\\c\"d", id),
            "hologram_a_b_c_d_1a2b3c4d.mp4"
        );
    }
}
