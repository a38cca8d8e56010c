//! Local media vault for Holocast.
//!
//! Uploaded source assets live under an uploads directory and rendered
//! outputs under a processed directory. Keys are flat filenames derived
//! from the project id; re-uploads overwrite in place (last-writer-wins).

pub mod keys;
pub mod vault;

pub use vault::{MediaVault, StorageError, StorageResult};
