//! Application state.
//!
//! All collaborators are constructed once at startup and injected here;
//! nothing hangs off module-level globals. Handlers extract the whole
//! state via `State<Arc<AppState>>`.

use holocast_core::Config;
use holocast_db::ProjectStore;
use holocast_processing::Compositor;
use holocast_storage::MediaVault;
use holocast_worker::{JobQueue, JobRunner};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ProjectStore>,
    pub vault: MediaVault,
    pub compositor: Arc<dyn Compositor>,
    pub runner: Arc<JobRunner>,
    pub job_queue: JobQueue,
    /// Present only with the Postgres backend; closed on shutdown.
    pub pool: Option<PgPool>,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
