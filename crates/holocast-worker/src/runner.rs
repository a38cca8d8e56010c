//! Per-project processing runner: the lifecycle state machine.
//!
//! `try_start` performs the synchronous preconditions and the atomic claim
//! into the processing state; `execute` runs inside a queue worker and
//! drives probe, graph construction, and the external compositor, absorbing
//! every failure into a terminal failed record. Callers observe the run
//! only by polling project status.

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use holocast_core::models::HologramSettings;
use holocast_core::AppError;
use holocast_db::{ClaimOutcome, ProjectStore, StoreError};
use holocast_processing::{
    build_filter_graph, Compositor, CompositorError, GraphError, MediaInspector, ProbeError,
};
use holocast_storage::{keys, MediaVault, StorageError};

use crate::queue::{HologramJob, JobQueue};

// Coarse progress milestones, monotone across the run.
const PROGRESS_PROBED: f64 = 10.0;
const PROGRESS_DIMENSIONS: f64 = 25.0;
const PROGRESS_GRAPH_BUILT: f64 = 40.0;
const PROGRESS_RENDER_START: f64 = 60.0;
const PROGRESS_RENDERING: f64 = 80.0;
const PROGRESS_FINALIZING: f64 = 95.0;

/// Failures inside the asynchronous run. Never propagated to callers;
/// the Display text becomes the stored error message.
#[derive(Debug, Error)]
enum RunError {
    #[error("could not read input metadata: {0}")]
    Probe(#[from] ProbeError),

    #[error("{0}")]
    Graph(#[from] GraphError),

    #[error("{0}")]
    Compositor(#[from] CompositorError),

    #[error("project store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("project record disappeared during processing")]
    Vanished,

    #[error("project is missing its source assets")]
    MissingAssets,
}

/// Drives one project through created -> processing -> {completed, failed}.
pub struct JobRunner {
    store: Arc<dyn ProjectStore>,
    inspector: Arc<dyn MediaInspector>,
    compositor: Arc<dyn Compositor>,
    vault: MediaVault,
}

impl JobRunner {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        inspector: Arc<dyn MediaInspector>,
        compositor: Arc<dyn Compositor>,
        vault: MediaVault,
    ) -> Self {
        Self {
            store,
            inspector,
            compositor,
            vault,
        }
    }

    /// Synchronous preconditions plus the atomic claim. On success the
    /// project is in the processing state with progress 0 and the run's
    /// settings persisted; nothing has been scheduled yet. Settings are
    /// expected to be validated by the caller.
    pub async fn try_start(
        &self,
        project_id: Uuid,
        settings: &HologramSettings,
    ) -> Result<(), AppError> {
        let project = self
            .store
            .get(project_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        if !project.ready_for_processing() {
            return Err(AppError::BadRequest(
                "Both base video and hologram media must be uploaded before processing"
                    .to_string(),
            ));
        }

        match self
            .store
            .begin_processing(project_id, settings)
            .await
            .map_err(AppError::from)?
        {
            ClaimOutcome::Claimed => {
                tracing::info!(project_id = %project_id, "Project claimed for processing");
                Ok(())
            }
            ClaimOutcome::AlreadyProcessing => Err(AppError::Conflict(
                "Project is already being processed".to_string(),
            )),
            // Deleted between the read and the claim.
            ClaimOutcome::NotFound => Err(AppError::NotFound("Project not found".to_string())),
        }
    }

    /// Claim the project and schedule its run, returning immediately.
    /// When the queue refuses the job, the claim is converted into a
    /// terminal failure so no phantom "processing" record remains.
    pub async fn start(
        &self,
        queue: &JobQueue,
        project_id: Uuid,
        settings: HologramSettings,
    ) -> Result<(), AppError> {
        self.try_start(project_id, &settings).await?;

        if let Err(err) = queue.try_submit(HologramJob::Composite { project_id }) {
            tracing::warn!(project_id = %project_id, "Claimed project could not be queued");
            if let Err(store_err) = self
                .store
                .mark_failed(project_id, "processing queue is full")
                .await
            {
                tracing::error!(
                    project_id = %project_id,
                    error = %store_err,
                    "Failed to record queue-full failure"
                );
            }
            return Err(err);
        }
        Ok(())
    }

    /// The asynchronous execution body. Failures never escape: they are
    /// persisted as terminal failed state with a diagnostic message, and
    /// any partially-written output file is removed.
    #[tracing::instrument(skip(self), fields(project.id = %project_id, job.status = tracing::field::Empty))]
    pub async fn execute(&self, project_id: Uuid) {
        let start = std::time::Instant::now();
        tracing::info!(project_id = %project_id, "Starting compositing run");

        match self.run_pipeline(project_id).await {
            Ok(output_size) => {
                tracing::Span::current().record("job.status", "success");
                tracing::info!(
                    project_id = %project_id,
                    output_size = output_size,
                    duration_ms = start.elapsed().as_millis(),
                    "Compositing run completed"
                );
            }
            Err(err) => {
                tracing::Span::current().record("job.status", "failed");
                tracing::error!(
                    project_id = %project_id,
                    error = %err,
                    duration_ms = start.elapsed().as_millis(),
                    "Compositing run failed"
                );

                self.remove_partial_output(project_id).await;

                if let Err(store_err) =
                    self.store.mark_failed(project_id, &err.to_string()).await
                {
                    tracing::error!(
                        project_id = %project_id,
                        error = %store_err,
                        "Failed to record run failure"
                    );
                }
            }
        }
    }

    async fn run_pipeline(&self, project_id: Uuid) -> Result<u64, RunError> {
        let project = self
            .store
            .get(project_id)
            .await?
            .ok_or(RunError::Vanished)?;
        let base_path = project.base_video_path.ok_or(RunError::MissingAssets)?;
        let overlay_path = project.overlay_media_path.ok_or(RunError::MissingAssets)?;
        // The run owns its settings copy; later edits to the record cannot
        // change a run in flight.
        let settings = project.settings;

        let info = self.inspector.probe(Path::new(&base_path)).await?;
        self.store
            .update_progress(project_id, PROGRESS_PROBED)
            .await?;
        tracing::info!(
            project_id = %project_id,
            base_width = info.width,
            base_height = info.height,
            "Base video analyzed"
        );

        self.store
            .update_progress(project_id, PROGRESS_DIMENSIONS)
            .await?;

        let graph = build_filter_graph(info.width, info.height, &settings)?;
        self.store
            .update_progress(project_id, PROGRESS_GRAPH_BUILT)
            .await?;
        tracing::debug!(
            project_id = %project_id,
            overlay_width = graph.overlay_width,
            overlay_height = graph.overlay_height,
            overlay_x = graph.overlay_x,
            overlay_y = graph.overlay_y,
            stages = graph.stages.len(),
            "Filter graph built"
        );

        let output_path = self.vault.output_path(&keys::output_key(project_id))?;
        self.store
            .update_progress(project_id, PROGRESS_RENDER_START)
            .await?;

        self.store
            .update_progress(project_id, PROGRESS_RENDERING)
            .await?;
        self.compositor
            .run(
                Path::new(&base_path),
                Path::new(&overlay_path),
                &graph,
                &output_path,
            )
            .await?;

        self.store
            .update_progress(project_id, PROGRESS_FINALIZING)
            .await?;
        let output_size = self.vault.file_size(&output_path).await?;

        self.store
            .mark_completed(
                project_id,
                &output_path.to_string_lossy(),
                output_size as i64,
            )
            .await?;

        Ok(output_size)
    }

    /// A failed run must not leave a half-written output behind.
    async fn remove_partial_output(&self, project_id: Uuid) {
        let Ok(output_path) = self.vault.output_path(&keys::output_key(project_id)) else {
            return;
        };
        if let Err(err) = self.vault.remove_if_exists(&output_path).await {
            tracing::warn!(
                project_id = %project_id,
                error = %err,
                "Failed to remove partial output file"
            );
        }
    }
}
