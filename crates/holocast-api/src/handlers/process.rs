//! Process and status endpoints: the entry points into the job state machine.

use axum::{
    extract::{Path, State},
    Json,
};
use holocast_core::models::{HologramSettings, ProcessAck, StatusReport};
use holocast_core::AppError;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v0/projects/{id}/process",
    tag = "processing",
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = HologramSettings,
    responses(
        (status = 200, description = "Processing started", body = ProcessAck),
        (status = 400, description = "Invalid settings or missing inputs", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 409, description = "Already processing", body = ErrorResponse),
        (status = 503, description = "Compositor unavailable or queue full", body = ErrorResponse)
    )
)]
pub async fn process_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(settings): ValidatedJson<HologramSettings>,
) -> Result<Json<ProcessAck>, HttpAppError> {
    // Every field is optional in the body; defaults were filled during
    // deserialization. Out-of-range values are rejected, not clamped.
    settings.validate().map_err(AppError::from)?;

    if state.compositor.version().await.is_none() {
        return Err(AppError::ServiceUnavailable(
            "FFmpeg is not available. Cannot process video.".to_string(),
        )
        .into());
    }

    state
        .runner
        .start(&state.job_queue, id, settings.clone())
        .await
        .map_err(HttpAppError::from)?;

    Ok(Json(ProcessAck {
        message: "Processing started".to_string(),
        project_id: id,
        settings,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v0/projects/{id}/status",
    tag = "processing",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Current processing status", body = StatusReport),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
pub async fn get_processing_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusReport>, HttpAppError> {
    let project = state
        .store
        .get(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(Json(StatusReport::from(&project)))
}
