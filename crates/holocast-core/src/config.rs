//! Configuration module
//!
//! Environment-driven configuration for the API, store, media directories,
//! and the background job pool. `from_env` applies defaults; `validate`
//! fails fast on misconfiguration before any service starts.

use std::env;
use std::path::PathBuf;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BASE_VIDEO_BYTES: usize = 100 * 1024 * 1024;
const DEFAULT_MAX_OVERLAY_MEDIA_BYTES: usize = 50 * 1024 * 1024;
const DEFAULT_JOB_QUEUE_SIZE: usize = 100;
const DEFAULT_MAX_CONCURRENT_JOBS: usize = 2;
const DEFAULT_PROJECT_LIST_LIMIT: i64 = 100;

/// Which project store backend to construct at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self, anyhow::Error> {
        match value.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow::anyhow!(
                "Unknown STORE_BACKEND '{}' (expected 'postgres' or 'memory')",
                other
            )),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub uploads_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub max_base_video_size_bytes: usize,
    pub max_overlay_media_size_bytes: usize,
    pub job_queue_size: usize,
    pub max_concurrent_jobs: usize,
    pub project_list_limit: i64,
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let store_backend = StoreBackend::parse(&env_string("STORE_BACKEND", "postgres"))?;

        let config = Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT),
            cors_origins: env_string("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            environment: env_string("ENVIRONMENT", "development"),
            store_backend,
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS),
            uploads_dir: PathBuf::from(env_string("UPLOADS_DIR", "./uploads")),
            processed_dir: PathBuf::from(env_string("PROCESSED_DIR", "./processed")),
            ffmpeg_path: env_string("FFMPEG_PATH", "ffmpeg"),
            ffprobe_path: env_string("FFPROBE_PATH", "ffprobe"),
            max_base_video_size_bytes: env_parse(
                "MAX_BASE_VIDEO_SIZE_BYTES",
                DEFAULT_MAX_BASE_VIDEO_BYTES,
            ),
            max_overlay_media_size_bytes: env_parse(
                "MAX_OVERLAY_MEDIA_SIZE_BYTES",
                DEFAULT_MAX_OVERLAY_MEDIA_BYTES,
            ),
            job_queue_size: env_parse("JOB_QUEUE_SIZE", DEFAULT_JOB_QUEUE_SIZE),
            max_concurrent_jobs: env_parse("MAX_CONCURRENT_JOBS", DEFAULT_MAX_CONCURRENT_JOBS),
            project_list_limit: env_parse("PROJECT_LIST_LIMIT", DEFAULT_PROJECT_LIST_LIMIT),
        };

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.store_backend == StoreBackend::Postgres && self.database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required when STORE_BACKEND is 'postgres'");
        }
        if self.max_base_video_size_bytes == 0 || self.max_overlay_media_size_bytes == 0 {
            anyhow::bail!("Upload size limits must be greater than zero");
        }
        if self.job_queue_size == 0 {
            anyhow::bail!("JOB_QUEUE_SIZE must be greater than zero");
        }
        if self.max_concurrent_jobs == 0 {
            anyhow::bail!("MAX_CONCURRENT_JOBS must be greater than zero");
        }
        if self.ffmpeg_path.is_empty() || self.ffprobe_path.is_empty() {
            anyhow::bail!("FFMPEG_PATH and FFPROBE_PATH must not be empty");
        }
        Ok(())
    }

    /// The larger of the two upload limits, for the request body limit layer.
    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_base_video_size_bytes
            .max(self.max_overlay_media_size_bytes)
    }
}
