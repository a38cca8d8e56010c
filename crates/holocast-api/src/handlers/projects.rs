//! Project CRUD: create, list, fetch.

use axum::{
    extract::{Path, State},
    Json,
};
use holocast_core::models::Project;
use holocast_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/v0/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created", body = Project),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateProjectRequest>,
) -> Result<Json<Project>, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let project = Project::new(request.name.trim().to_string());
    state
        .store
        .insert(&project)
        .await
        .map_err(HttpAppError::from)?;

    tracing::info!(project_id = %project.id, name = %project.name, "Project created");
    Ok(Json(project))
}

#[utoipa::path(
    get,
    path = "/api/v0/projects",
    tag = "projects",
    responses(
        (status = 200, description = "Projects, newest first", body = Vec<Project>)
    )
)]
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Project>>, HttpAppError> {
    let projects = state
        .store
        .list(state.config.project_list_limit)
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(projects))
}

#[utoipa::path(
    get,
    path = "/api/v0/projects/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "The project", body = Project),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, HttpAppError> {
    let project = state
        .store
        .get(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    Ok(Json(project))
}
