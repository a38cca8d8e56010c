//! Source asset uploads: base video and hologram overlay media.
//!
//! Re-uploads overwrite the previous asset in place; the project record
//! always points at the latest bytes.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    Json,
};
use holocast_core::models::{OverlayKind, UploadReceipt};
use holocast_core::{format_file_size, AppError};
use holocast_storage::keys;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

struct UploadedFile {
    filename: String,
    content_type: String,
    data: Bytes,
}

/// Pull the `file` field out of a multipart body.
async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                AppError::BadRequest("Missing content type for file field".to_string())
            })?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        if data.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }

        return Ok(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    Err(AppError::BadRequest(
        "Missing 'file' field in multipart body".to_string(),
    ))
}

async fn require_project(state: &AppState, id: Uuid) -> Result<(), HttpAppError> {
    state
        .store
        .get(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Project not found".to_string())))?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v0/projects/{id}/base-video",
    tag = "uploads",
    params(("id" = Uuid, Path, description = "Project id")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Base video uploaded", body = UploadReceipt),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
pub async fn upload_base_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<UploadReceipt>, HttpAppError> {
    require_project(&state, id).await?;

    let upload = read_file_field(multipart).await?;

    if !upload.content_type.to_lowercase().starts_with("video/") {
        return Err(AppError::BadRequest("File must be a video".to_string()).into());
    }
    if upload.data.len() > state.config.max_base_video_size_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Video file too large (max {})",
            format_file_size(state.config.max_base_video_size_bytes as u64)
        ))
        .into());
    }

    let extension = keys::sanitize_extension(
        &upload.filename,
        keys::extension_for_content_type(&upload.content_type),
    );
    let key = keys::base_video_key(id, &extension);
    let (path, size) = state
        .vault
        .save_upload(&key, &upload.data)
        .await
        .map_err(HttpAppError::from)?;

    state
        .store
        .set_base_video(id, &path.to_string_lossy(), &upload.filename, size as i64)
        .await
        .map_err(HttpAppError::from)?;

    tracing::info!(project_id = %id, size = size, filename = %upload.filename, "Base video uploaded");

    Ok(Json(UploadReceipt {
        message: "Base video uploaded successfully".to_string(),
        filename: upload.filename,
        size: format_file_size(size),
        kind: None,
        path: key,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v0/projects/{id}/overlay-media",
    tag = "uploads",
    params(("id" = Uuid, Path, description = "Project id")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Overlay media uploaded", body = UploadReceipt),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
pub async fn upload_overlay_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<UploadReceipt>, HttpAppError> {
    require_project(&state, id).await?;

    let upload = read_file_field(multipart).await?;

    let kind = OverlayKind::from_content_type(&upload.content_type)
        .ok_or_else(|| AppError::BadRequest("File must be a video or image".to_string()))?;
    if upload.data.len() > state.config.max_overlay_media_size_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Media file too large (max {})",
            format_file_size(state.config.max_overlay_media_size_bytes as u64)
        ))
        .into());
    }

    let extension = keys::sanitize_extension(
        &upload.filename,
        keys::extension_for_content_type(&upload.content_type),
    );
    let key = keys::overlay_media_key(id, &extension);
    let (path, size) = state
        .vault
        .save_upload(&key, &upload.data)
        .await
        .map_err(HttpAppError::from)?;

    state
        .store
        .set_overlay_media(
            id,
            &path.to_string_lossy(),
            &upload.filename,
            size as i64,
            kind,
        )
        .await
        .map_err(HttpAppError::from)?;

    tracing::info!(
        project_id = %id,
        size = size,
        kind = %kind,
        filename = %upload.filename,
        "Overlay media uploaded"
    );

    Ok(Json(UploadReceipt {
        message: "Hologram media uploaded successfully".to_string(),
        filename: upload.filename,
        size: format_file_size(size),
        kind: Some(kind),
        path: key,
    }))
}
