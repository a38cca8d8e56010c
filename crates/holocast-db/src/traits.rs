//! Project store abstraction trait

use async_trait::async_trait;
use holocast_core::models::{HologramSettings, OverlayKind, Project};
use holocast_core::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Project not found: {0}")]
    NotFound(Uuid),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Invalid stored record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound("Project not found".to_string()),
            StoreError::Backend(msg) => AppError::Database(msg),
            StoreError::Corrupt(msg) => AppError::Database(msg),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of the atomic claim into the processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The project was transitioned into processing by this call.
    Claimed,
    /// Another run already holds the processing state.
    AlreadyProcessing,
    /// No project exists with the given id.
    NotFound,
}

/// Persistence seam for project records.
///
/// All mutations are by-id, single-record updates; the store must provide
/// read-after-write consistency for a single project id. `begin_processing`
/// is the one compound operation: a compare-and-swap from any non-processing
/// status into processing, so two concurrent starts can never both claim the
/// same project.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Persist a freshly created project.
    async fn insert(&self, project: &Project) -> StoreResult<()>;

    /// Fetch one project by id.
    async fn get(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// List projects, newest first.
    async fn list(&self, limit: i64) -> StoreResult<Vec<Project>>;

    /// Total number of projects.
    async fn count(&self) -> StoreResult<i64>;

    /// Record a base video upload (idempotent overwrite).
    async fn set_base_video(
        &self,
        id: Uuid,
        path: &str,
        filename: &str,
        size: i64,
    ) -> StoreResult<()>;

    /// Record an overlay media upload (idempotent overwrite).
    async fn set_overlay_media(
        &self,
        id: Uuid,
        path: &str,
        filename: &str,
        size: i64,
        kind: OverlayKind,
    ) -> StoreResult<()>;

    /// Atomically claim the project for processing: persists the run's
    /// settings, resets progress to zero, and clears any previous run's
    /// output and error fields. Fails the claim (without mutating) when the
    /// project is already processing.
    async fn begin_processing(
        &self,
        id: Uuid,
        settings: &HologramSettings,
    ) -> StoreResult<ClaimOutcome>;

    /// Update the progress percentage of a processing run.
    async fn update_progress(&self, id: Uuid, progress: f64) -> StoreResult<()>;

    /// Terminal success: records the output asset and sets progress to 100.
    async fn mark_completed(
        &self,
        id: Uuid,
        output_path: &str,
        output_size: i64,
    ) -> StoreResult<()>;

    /// Terminal failure: records the diagnostic, resets progress to zero,
    /// and guarantees no output asset is referenced.
    async fn mark_failed(&self, id: Uuid, error_message: &str) -> StoreResult<()>;
}
