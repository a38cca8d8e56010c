//! Project and upload API integration tests.
//!
//! Run with: `cargo test -p holocast-api --test projects_test`.
//! No external services required.

mod helpers;

use helpers::{api_path, create_test_project, setup_test_app};

#[tokio::test]
async fn test_create_get_and_list_projects() {
    let app = setup_test_app().await;
    let client = app.client();

    let id = create_test_project(&app, "Concert hologram").await;

    let get_res = client.get(&api_path(&format!("/projects/{}", id))).await;
    assert_eq!(get_res.status_code(), 200);
    let project: serde_json::Value = get_res.json();
    assert_eq!(
        project.get("name").and_then(|v| v.as_str()),
        Some("Concert hologram")
    );
    assert_eq!(
        project.get("status").and_then(|v| v.as_str()),
        Some("created")
    );
    assert_eq!(
        project.get("processing_progress").and_then(|v| v.as_f64()),
        Some(0.0)
    );
    assert!(project.get("base_video_path").unwrap().is_null());

    let list_res = client.get(&api_path("/projects")).await;
    assert_eq!(list_res.status_code(), 200);
    let list: Vec<serde_json::Value> = list_res.json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].get("id").and_then(|v| v.as_str()), Some(id.as_str()));
}

#[tokio::test]
async fn test_get_missing_project_is_404() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .get(&api_path(&format!("/projects/{}", uuid::Uuid::new_v4())))
        .await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_create_project_rejects_empty_name() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post(&api_path("/projects"))
        .json(&serde_json::json!({ "name": "" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_system_status_reports_toolchain_and_counts() {
    let app = setup_test_app().await;
    create_test_project(&app, "one").await;
    create_test_project(&app, "two").await;

    let response = app.client().get(&api_path("/system")).await;
    assert_eq!(response.status_code(), 200);
    let status: serde_json::Value = response.json();
    assert_eq!(
        status.get("ffmpeg_available").and_then(|v| v.as_bool()),
        Some(true)
    );
    assert_eq!(
        status.get("ffmpeg_version").and_then(|v| v.as_str()),
        Some("6.0-test")
    );
    assert_eq!(
        status.get("total_projects").and_then(|v| v.as_i64()),
        Some(2)
    );
}

#[tokio::test]
async fn test_upload_base_video_records_asset() {
    let app = setup_test_app().await;
    let id = create_test_project(&app, "Upload test").await;

    let form = axum_test::multipart::MultipartForm::new().add_part(
        "file",
        axum_test::multipart::Part::bytes(b"fake base video bytes".as_slice())
            .file_name("scene.mp4")
            .mime_type("video/mp4"),
    );
    let response = app
        .client()
        .post(&api_path(&format!("/projects/{}/base-video", id)))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 200);
    let receipt: serde_json::Value = response.json();
    assert_eq!(
        receipt.get("filename").and_then(|v| v.as_str()),
        Some("scene.mp4")
    );
    assert_eq!(
        receipt.get("size").and_then(|v| v.as_str()),
        Some("21.0 B")
    );
    assert_eq!(
        receipt.get("path").and_then(|v| v.as_str()),
        Some(format!("base_{}.mp4", id).as_str())
    );

    let project: serde_json::Value = app
        .client()
        .get(&api_path(&format!("/projects/{}", id)))
        .await
        .json();
    assert!(project
        .get("base_video_path")
        .and_then(|v| v.as_str())
        .unwrap()
        .ends_with(&format!("base_{}.mp4", id)));
    assert_eq!(
        project.get("base_video_size").and_then(|v| v.as_i64()),
        Some(21)
    );
}

#[tokio::test]
async fn test_upload_overlay_media_records_kind() {
    let app = setup_test_app().await;
    let id = create_test_project(&app, "Overlay test").await;

    let form = axum_test::multipart::MultipartForm::new().add_part(
        "file",
        axum_test::multipart::Part::bytes(b"png bytes".as_slice())
            .file_name("ghost.png")
            .mime_type("image/png"),
    );
    let response = app
        .client()
        .post(&api_path(&format!("/projects/{}/overlay-media", id)))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 200);
    let receipt: serde_json::Value = response.json();
    assert_eq!(receipt.get("kind").and_then(|v| v.as_str()), Some("image"));

    let project: serde_json::Value = app
        .client()
        .get(&api_path(&format!("/projects/{}", id)))
        .await
        .json();
    assert_eq!(
        project.get("overlay_media_kind").and_then(|v| v.as_str()),
        Some("image")
    );
}

#[tokio::test]
async fn test_upload_rejects_wrong_content_type() {
    let app = setup_test_app().await;
    let id = create_test_project(&app, "Bad upload").await;

    let form = axum_test::multipart::MultipartForm::new().add_part(
        "file",
        axum_test::multipart::Part::bytes(b"plain text".as_slice())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );
    let response = app
        .client()
        .post(&api_path(&format!("/projects/{}/base-video", id)))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 400);

    let form = axum_test::multipart::MultipartForm::new().add_part(
        "file",
        axum_test::multipart::Part::bytes(b"plain text".as_slice())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );
    let response = app
        .client()
        .post(&api_path(&format!("/projects/{}/overlay-media", id)))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_upload_to_missing_project_is_404() {
    let app = setup_test_app().await;

    let form = axum_test::multipart::MultipartForm::new().add_part(
        "file",
        axum_test::multipart::Part::bytes(b"bytes".as_slice())
            .file_name("scene.mp4")
            .mime_type("video/mp4"),
    );
    let response = app
        .client()
        .post(&api_path(&format!(
            "/projects/{}/base-video",
            uuid::Uuid::new_v4()
        )))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_reupload_overwrites_previous_asset() {
    let app = setup_test_app().await;
    let id = create_test_project(&app, "Reupload").await;

    for (bytes, expected_size) in [(b"first".as_slice(), 5), (b"second!".as_slice(), 7)] {
        let form = axum_test::multipart::MultipartForm::new().add_part(
            "file",
            axum_test::multipart::Part::bytes(bytes)
                .file_name("scene.mp4")
                .mime_type("video/mp4"),
        );
        let response = app
            .client()
            .post(&api_path(&format!("/projects/{}/base-video", id)))
            .multipart(form)
            .await;
        assert_eq!(response.status_code(), 200);

        let project: serde_json::Value = app
            .client()
            .get(&api_path(&format!("/projects/{}", id)))
            .await
            .json();
        assert_eq!(
            project.get("base_video_size").and_then(|v| v.as_i64()),
            Some(expected_size)
        );
    }
}
