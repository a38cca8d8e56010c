//! System status endpoint: toolchain availability and project counts.

use axum::{extract::State, Json};
use holocast_core::models::SystemStatus;
use std::sync::Arc;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v0/system",
    tag = "system",
    responses(
        (status = 200, description = "System status", body = SystemStatus),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_system_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemStatus>, HttpAppError> {
    let ffmpeg_version = state.compositor.version().await;
    let total_projects = state.store.count().await.map_err(HttpAppError::from)?;

    Ok(Json(SystemStatus {
        message: "Holocast compositing API".to_string(),
        ffmpeg_available: ffmpeg_version.is_some(),
        ffmpeg_version,
        uploads_directory: state.vault.uploads_dir().display().to_string(),
        processed_directory: state.vault.processed_dir().display().to_string(),
        total_projects,
    }))
}
