//! Filesystem vault: validated key-to-path mapping and async file IO.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Local media vault managing the uploads and processed directories.
///
/// The compositor consumes real filesystem paths, so this is a concrete
/// type rather than a backend trait: both directories must live on the
/// same host that runs ffmpeg.
#[derive(Clone)]
pub struct MediaVault {
    uploads_dir: PathBuf,
    processed_dir: PathBuf,
}

/// Reject keys that could escape the vault directories.
fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.contains("..")
        || key.starts_with('/')
        || key.contains('/')
        || key.contains('\\')
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            key
        )));
    }
    Ok(())
}

impl MediaVault {
    /// Create a vault, creating both directories if missing.
    pub async fn new(
        uploads_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
    ) -> StorageResult<Self> {
        let uploads_dir = uploads_dir.into();
        let processed_dir = processed_dir.into();

        for dir in [&uploads_dir, &processed_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create media directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(MediaVault {
            uploads_dir,
            processed_dir,
        })
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Path for an uploaded source asset key.
    pub fn upload_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.uploads_dir.join(key))
    }

    /// Path for a rendered output key.
    pub fn output_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.processed_dir.join(key))
    }

    /// Write an uploaded asset, overwriting any previous upload for the key.
    /// Returns the final path and the byte count written.
    pub async fn save_upload(&self, key: &str, data: &[u8]) -> StorageResult<(PathBuf, u64)> {
        let path = self.upload_path(key)?;
        fs::write(&path, data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::debug!(key = %key, bytes = data.len(), "Asset written to vault");
        Ok((path, data.len() as u64))
    }

    /// Size in bytes of a file, erroring if it does not exist.
    pub async fn file_size(&self, path: &Path) -> StorageResult<u64> {
        let metadata = fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.display().to_string())
            } else {
                StorageError::IoError(e)
            }
        })?;
        Ok(metadata.len())
    }

    /// Delete a file if present; missing files are not an error.
    pub async fn remove_if_exists(&self, path: &Path) -> StorageResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed file from vault");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    /// Open a file for streaming reads (downloads).
    pub async fn open_for_read(&self, path: &Path) -> StorageResult<tokio::fs::File> {
        fs::File::open(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.display().to_string())
            } else {
                StorageError::IoError(e)
            }
        })
    }
}
