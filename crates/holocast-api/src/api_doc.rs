//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use holocast_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Holocast API",
        version = "0.1.0",
        description = "Hologram video compositing backend: upload a base video and an overlay asset, tune the hologram look, and render the composite through FFmpeg. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::system::get_system_status,
        handlers::projects::create_project,
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::upload::upload_base_video,
        handlers::upload::upload_overlay_media,
        handlers::process::process_project,
        handlers::process::get_processing_status,
        handlers::download::download_output,
    ),
    components(schemas(
        models::Project,
        models::ProjectStatus,
        models::OverlayKind,
        models::HologramSettings,
        models::StatusReport,
        models::UploadReceipt,
        models::ProcessAck,
        models::SystemStatus,
        handlers::projects::CreateProjectRequest,
        error::ErrorResponse,
    )),
    tags(
        (name = "system", description = "Service health and toolchain availability"),
        (name = "projects", description = "Project lifecycle"),
        (name = "uploads", description = "Source asset uploads"),
        (name = "processing", description = "Compositing jobs, status, and downloads")
    )
)]
pub struct ApiDoc;
