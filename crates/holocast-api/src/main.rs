use holocast_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env first so Config sees it
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Initialize the application (telemetry, store, services, routes)
    let (state, router) = holocast_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    holocast_api::setup::server::start_server(&config, router, state).await?;

    Ok(())
}
