//! Test helpers: build AppState and router for integration tests.
//!
//! Runs against the in-memory store and a mock ffprobe/ffmpeg boundary,
//! so no external processes or containers are required.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use holocast_api::constants;
use holocast_api::setup::routes;
use holocast_api::state::AppState;
use holocast_core::{Config, StoreBackend};
use holocast_db::InMemoryProjectStore;
use holocast_processing::{
    Compositor, CompositorError, FilterGraph, MediaInfo, MediaInspector, ProbeError,
};
use holocast_storage::MediaVault;
use holocast_worker::{JobQueue, JobRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Inspector double: fixed dimensions or a hard failure.
pub struct MockInspector {
    pub width: u32,
    pub height: u32,
    pub fail: bool,
}

impl Default for MockInspector {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fail: false,
        }
    }
}

#[async_trait]
impl MediaInspector for MockInspector {
    async fn probe(&self, _path: &Path) -> Result<MediaInfo, ProbeError> {
        if self.fail {
            return Err(ProbeError::Failed("unreadable input".to_string()));
        }
        Ok(MediaInfo {
            width: self.width,
            height: self.height,
            duration: Some(10.0),
            codec: Some("h264".to_string()),
        })
    }
}

/// Compositor double: writes a fixed payload, optionally slowly or not at all.
pub struct MockCompositor {
    pub fail: bool,
    pub available: bool,
    pub render_delay: Duration,
}

impl Default for MockCompositor {
    fn default() -> Self {
        Self {
            fail: false,
            available: true,
            render_delay: Duration::ZERO,
        }
    }
}

pub const RENDERED_BYTES: &[u8] = b"rendered output";

#[async_trait]
impl Compositor for MockCompositor {
    async fn run(
        &self,
        _base_path: &Path,
        _overlay_path: &Path,
        _graph: &FilterGraph,
        output_path: &Path,
    ) -> Result<(), CompositorError> {
        if !self.render_delay.is_zero() {
            tokio::time::sleep(self.render_delay).await;
        }
        if self.fail {
            return Err(CompositorError::Failed {
                exit_code: Some(1),
                diagnostic: "Invalid data found when processing input".to_string(),
            });
        }
        tokio::fs::write(output_path, RENDERED_BYTES).await.unwrap();
        Ok(())
    }

    async fn version(&self) -> Option<String> {
        if self.available {
            Some("6.0-test".to_string())
        } else {
            None
        }
    }
}

/// Test application: server plus the owned backing resources.
pub struct TestApp {
    pub server: TestServer,
    pub store: InMemoryProjectStore,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config(uploads_dir: PathBuf, processed_dir: PathBuf) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        store_backend: StoreBackend::Memory,
        database_url: None,
        db_max_connections: 5,
        db_timeout_seconds: 5,
        uploads_dir,
        processed_dir,
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        max_base_video_size_bytes: 10 * 1024 * 1024,
        max_overlay_media_size_bytes: 5 * 1024 * 1024,
        job_queue_size: 16,
        max_concurrent_jobs: 2,
        project_list_limit: 100,
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(MockInspector::default(), MockCompositor::default()).await
}

pub async fn setup_test_app_with(inspector: MockInspector, compositor: MockCompositor) -> TestApp {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(
        temp_dir.path().join("uploads"),
        temp_dir.path().join("processed"),
    );

    let vault = MediaVault::new(&config.uploads_dir, &config.processed_dir)
        .await
        .expect("vault");
    let store = InMemoryProjectStore::new();
    let compositor: Arc<dyn Compositor> = Arc::new(compositor);

    let runner = Arc::new(JobRunner::new(
        Arc::new(store.clone()),
        Arc::new(inspector),
        compositor.clone(),
        vault.clone(),
    ));
    let job_queue = JobQueue::new(
        runner.clone(),
        config.job_queue_size,
        config.max_concurrent_jobs,
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        store: Arc::new(store.clone()),
        vault,
        compositor,
        runner,
        job_queue,
        pool: None,
    });

    let router = routes::setup_routes(&config, state).expect("router");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        store,
        _temp_dir: temp_dir,
    }
}

/// Create a project via the API and return its id.
pub async fn create_test_project(app: &TestApp, name: &str) -> String {
    let response = app
        .client()
        .post(&api_path("/projects"))
        .json(&serde_json::json!({ "name": name }))
        .await;
    assert_eq!(response.status_code(), 200, "create project");
    let created: serde_json::Value = response.json();
    created
        .get("id")
        .and_then(|v| v.as_str())
        .expect("id in response")
        .to_string()
}

/// Upload both source assets for a project.
pub async fn upload_both_assets(app: &TestApp, project_id: &str) {
    let base = axum_test::multipart::MultipartForm::new().add_part(
        "file",
        axum_test::multipart::Part::bytes(b"fake base video bytes".as_slice())
            .file_name("scene.mp4")
            .mime_type("video/mp4"),
    );
    let response = app
        .client()
        .post(&api_path(&format!("/projects/{}/base-video", project_id)))
        .multipart(base)
        .await;
    assert_eq!(response.status_code(), 200, "upload base video");

    let overlay = axum_test::multipart::MultipartForm::new().add_part(
        "file",
        axum_test::multipart::Part::bytes(b"fake overlay image bytes".as_slice())
            .file_name("ghost.png")
            .mime_type("image/png"),
    );
    let response = app
        .client()
        .post(&api_path(&format!(
            "/projects/{}/overlay-media",
            project_id
        )))
        .multipart(overlay)
        .await;
    assert_eq!(response.status_code(), 200, "upload overlay media");
}

/// Poll the status endpoint until the project reaches `status` or time runs out.
pub async fn wait_for_status(app: &TestApp, project_id: &str, status: &str) -> serde_json::Value {
    for _ in 0..300 {
        let response = app
            .client()
            .get(&api_path(&format!("/projects/{}/status", project_id)))
            .await;
        assert_eq!(response.status_code(), 200, "status poll");
        let report: serde_json::Value = response.json();
        if report.get("status").and_then(|v| v.as_str()) == Some(status) {
            return report;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("project never reached status '{}'", status);
}
