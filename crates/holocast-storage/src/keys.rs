//! Storage key naming for project assets.

use std::path::Path;
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 8;

/// Key for a project's base video upload: `base_{id}.{ext}`.
pub fn base_video_key(project_id: Uuid, extension: &str) -> String {
    format!("base_{}.{}", project_id, extension)
}

/// Key for a project's overlay media upload: `hologram_{id}.{ext}`.
pub fn overlay_media_key(project_id: Uuid, extension: &str) -> String {
    format!("hologram_{}.{}", project_id, extension)
}

/// Key for a project's rendered output: `hologram_{id}.mp4`.
pub fn output_key(project_id: Uuid) -> String {
    format!("hologram_{}.mp4", project_id)
}

/// Extract a safe, lowercase extension from a client-supplied filename.
/// Anything non-alphanumeric or overlong falls back to `fallback`.
pub fn sanitize_extension(filename: &str, fallback: &str) -> String {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if extension.is_empty()
        || extension.len() > MAX_EXTENSION_LEN
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        fallback.to_string()
    } else {
        extension
    }
}

/// Default extension for a MIME type, used when the filename has none.
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    match content_type.to_lowercase().as_str() {
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "video/x-msvideo" => "avi",
        "video/x-matroska" => "mkv",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        ct if ct.starts_with("video/") => "mp4",
        ct if ct.starts_with("image/") => "png",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_naming() {
        let id = Uuid::nil();
        assert_eq!(
            base_video_key(id, "mp4"),
            "base_00000000-0000-0000-0000-000000000000.mp4"
        );
        assert_eq!(
            overlay_media_key(id, "png"),
            "hologram_00000000-0000-0000-0000-000000000000.png"
        );
        assert_eq!(
            output_key(id),
            "hologram_00000000-0000-0000-0000-000000000000.mp4"
        );
    }

    #[test]
    fn test_sanitize_extension_normal() {
        assert_eq!(sanitize_extension("clip.MP4", "bin"), "mp4");
        assert_eq!(sanitize_extension("photo.jpeg", "bin"), "jpeg");
    }

    #[test]
    fn test_sanitize_extension_falls_back() {
        assert_eq!(sanitize_extension("noextension", "mp4"), "mp4");
        assert_eq!(sanitize_extension("weird.../../", "mp4"), "mp4");
        assert_eq!(sanitize_extension("x.reallylongext", "mp4"), "mp4");
        assert_eq!(sanitize_extension("x.m p4", "mp4"), "mp4");
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for_content_type("video/mp4"), "mp4");
        assert_eq!(extension_for_content_type("image/png"), "png");
        assert_eq!(extension_for_content_type("video/ogg"), "mp4");
        assert_eq!(extension_for_content_type("application/json"), "bin");
    }
}
