//! Error types for the storage layer.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading or writing a storage slot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize task collection")]
    Serialize(#[from] serde_json::Error),

    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
