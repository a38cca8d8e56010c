//! Core domain types for Holocast: configuration, errors, and models.

pub mod config;
pub mod error;
pub mod format;
pub mod models;

pub use config::{Config, StoreBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use format::format_file_size;
