//! Project store construction: Postgres pool + migrations, or in-memory.

use anyhow::{Context, Result};
use holocast_core::{Config, StoreBackend};
use holocast_db::{InMemoryProjectStore, PostgresProjectStore, ProjectStore};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Open the configured store backend. Returns the pool handle alongside the
/// trait object so the server can close it on shutdown.
pub async fn setup_store(config: &Config) -> Result<(Arc<dyn ProjectStore>, Option<PgPool>)> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
                .connect(url)
                .await
                .context("Failed to connect to Postgres")?;

            sqlx::migrate!("../../migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            tracing::info!(
                max_connections = config.db_max_connections,
                "Connected to Postgres and applied migrations"
            );
            Ok((Arc::new(PostgresProjectStore::new(pool.clone())), Some(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory project store; records will not survive restarts");
            Ok((Arc::new(InMemoryProjectStore::new()), None))
        }
    }
}
