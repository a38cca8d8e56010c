//! Service wiring: vault, toolchain boundary, runner, and job queue.

use anyhow::{Context, Result};
use holocast_core::Config;
use holocast_db::ProjectStore;
use holocast_processing::{Compositor, FfmpegCompositor, FfprobeInspector, MediaInspector};
use holocast_storage::MediaVault;
use holocast_worker::{JobQueue, JobRunner};
use sqlx::PgPool;
use std::sync::Arc;

use crate::state::AppState;

/// Build all services and assemble the application state.
pub async fn initialize_services(
    config: &Config,
    store: Arc<dyn ProjectStore>,
    pool: Option<PgPool>,
) -> Result<Arc<AppState>> {
    let vault = MediaVault::new(&config.uploads_dir, &config.processed_dir)
        .await
        .context("Failed to initialize media vault")?;

    let inspector: Arc<dyn MediaInspector> = Arc::new(
        FfprobeInspector::new(config.ffprobe_path.clone())
            .context("Failed to initialize ffprobe inspector")?,
    );
    let compositor: Arc<dyn Compositor> = Arc::new(
        FfmpegCompositor::new(config.ffmpeg_path.clone())
            .context("Failed to initialize ffmpeg compositor")?,
    );

    let runner = Arc::new(JobRunner::new(
        store.clone(),
        inspector,
        compositor.clone(),
        vault.clone(),
    ));
    let job_queue = JobQueue::new(
        runner.clone(),
        config.job_queue_size,
        config.max_concurrent_jobs,
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        store,
        vault,
        compositor,
        runner,
        job_queue,
        pool,
    }))
}
