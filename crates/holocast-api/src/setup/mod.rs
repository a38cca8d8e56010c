//! Application setup and initialization
//!
//! All initialization logic lives here rather than in main.rs: telemetry,
//! the project store, services, and routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use holocast_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();
    tracing::info!("Configuration loaded and validated successfully");

    // Open the project store
    let (store, pool) = database::setup_store(&config).await?;

    // Initialize services (vault, toolchain, runner, queue)
    let state = services::initialize_services(&config, store, pool).await?;

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
