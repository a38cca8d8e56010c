//! Postgres-backed project store.
//!
//! Uses runtime queries with a row type and converts to the domain model
//! in one place. The processing claim is a single conditional UPDATE so
//! the status check-and-set cannot race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use holocast_core::models::{HologramSettings, OverlayKind, Project, ProjectStatus};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::traits::{ClaimOutcome, ProjectStore, StoreError, StoreResult};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    base_video_path: Option<String>,
    base_video_filename: Option<String>,
    base_video_size: Option<i64>,
    overlay_media_path: Option<String>,
    overlay_media_filename: Option<String>,
    overlay_media_size: Option<i64>,
    overlay_media_kind: Option<String>,
    settings: serde_json::Value,
    status: String,
    processing_progress: f64,
    output_path: Option<String>,
    output_size: Option<i64>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self) -> StoreResult<Project> {
        let status: ProjectStatus = self
            .status
            .parse()
            .map_err(|e: String| StoreError::Corrupt(e))?;
        let overlay_media_kind = self
            .overlay_media_kind
            .map(|k| k.parse::<OverlayKind>())
            .transpose()
            .map_err(StoreError::Corrupt)?;
        let settings: HologramSettings = serde_json::from_value(self.settings)
            .map_err(|e| StoreError::Corrupt(format!("settings column: {}", e)))?;

        Ok(Project {
            id: self.id,
            name: self.name,
            base_video_path: self.base_video_path,
            base_video_filename: self.base_video_filename,
            base_video_size: self.base_video_size,
            overlay_media_path: self.overlay_media_path,
            overlay_media_filename: self.overlay_media_filename,
            overlay_media_size: self.overlay_media_size,
            overlay_media_kind,
            settings,
            status,
            processing_progress: self.processing_progress,
            output_path: self.output_path,
            output_size: self.output_size,
            error_message: self.error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, name, base_video_path, base_video_filename, base_video_size, \
     overlay_media_path, overlay_media_filename, overlay_media_size, overlay_media_kind, \
     settings, status, processing_progress, output_path, output_size, error_message, \
     created_at, updated_at";

#[derive(Clone)]
pub struct PostgresProjectStore {
    pool: PgPool,
}

impl PostgresProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn settings_json(settings: &HologramSettings) -> StoreResult<serde_json::Value> {
        serde_json::to_value(settings)
            .map_err(|e| StoreError::Backend(format!("settings serialization: {}", e)))
    }

    fn require_row(id: Uuid, rows_affected: u64) -> StoreResult<()> {
        if rows_affected == 0 {
            Err(StoreError::NotFound(id))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProjectStore for PostgresProjectStore {
    async fn insert(&self, project: &Project) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO projects (id, name, settings, status, processing_progress, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(Self::settings_json(&project.settings)?)
        .bind(project.status.to_string())
        .bind(project.processing_progress)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as::<Postgres, ProjectRow>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProjectRow::into_project).transpose()
    }

    async fn list(&self, limit: i64) -> StoreResult<Vec<Project>> {
        let rows: Vec<ProjectRow> = sqlx::query_as::<Postgres, ProjectRow>(&format!(
            "SELECT {} FROM projects ORDER BY created_at DESC LIMIT $1",
            SELECT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProjectRow::into_project).collect()
    }

    async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn set_base_video(
        &self,
        id: Uuid,
        path: &str,
        filename: &str,
        size: i64,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE projects SET base_video_path = $2, base_video_filename = $3, \
             base_video_size = $4, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(path)
        .bind(filename)
        .bind(size)
        .execute(&self.pool)
        .await?;
        Self::require_row(id, result.rows_affected())
    }

    async fn set_overlay_media(
        &self,
        id: Uuid,
        path: &str,
        filename: &str,
        size: i64,
        kind: OverlayKind,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE projects SET overlay_media_path = $2, overlay_media_filename = $3, \
             overlay_media_size = $4, overlay_media_kind = $5, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(path)
        .bind(filename)
        .bind(size)
        .bind(kind.to_string())
        .execute(&self.pool)
        .await?;
        Self::require_row(id, result.rows_affected())
    }

    async fn begin_processing(
        &self,
        id: Uuid,
        settings: &HologramSettings,
    ) -> StoreResult<ClaimOutcome> {
        let result = sqlx::query(
            "UPDATE projects SET status = 'processing', processing_progress = 0, \
             settings = $2, output_path = NULL, output_size = NULL, error_message = NULL, \
             updated_at = now() WHERE id = $1 AND status <> 'processing'",
        )
        .bind(id)
        .bind(Self::settings_json(settings)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            tracing::debug!(project_id = %id, "Project claimed for processing");
            return Ok(ClaimOutcome::Claimed);
        }

        // The claim matched nothing: either the row is missing or a run
        // already holds the processing state.
        let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_some() {
            Ok(ClaimOutcome::AlreadyProcessing)
        } else {
            Ok(ClaimOutcome::NotFound)
        }
    }

    async fn update_progress(&self, id: Uuid, progress: f64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE projects SET processing_progress = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(progress)
        .execute(&self.pool)
        .await?;
        Self::require_row(id, result.rows_affected())
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        output_path: &str,
        output_size: i64,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE projects SET status = 'completed', processing_progress = 100, \
             output_path = $2, output_size = $3, error_message = NULL, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(output_path)
        .bind(output_size)
        .execute(&self.pool)
        .await?;
        Self::require_row(id, result.rows_affected())
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE projects SET status = 'failed', processing_progress = 0, \
             error_message = $2, output_path = NULL, output_size = NULL, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error_message)
        .execute(&self.pool)
        .await?;
        Self::require_row(id, result.rows_affected())
    }
}
