//! Error types for the core module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while loading project configuration.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid context name: {0:?}")]
    InvalidContext(String),

    #[error("Invalid config file {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid component {path:?}: {message}")]
    InvalidComponent { path: String, message: String },

    #[error("Duplicate component path: {0}")]
    DuplicateComponent(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
