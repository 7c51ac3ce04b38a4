//! Folder engine error types

use crate::providers::store::StoreError;
use thiserror::Error;

/// Result type alias for folder engine operations
pub type Result<T> = std::result::Result<T, FolderError>;

/// Every failure names the key or prefix it was working on and keeps the
/// store error as its source. None of them are retried.
#[derive(Error, Debug)]
pub enum FolderError {
    #[error("File exceeds {} MB ({size} bytes, limit {limit})", .limit / (1024 * 1024))]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Bucket access error ({bucket}): {source}")]
    BackendUnavailable {
        bucket: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to rename {from} to {to}: {source}")]
    RenameFailed {
        from: String,
        to: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to delete folder {prefix}: {source}")]
    BatchDeleteFailed {
        prefix: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to write {key}: {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to delete {key}: {source}")]
    DeleteFailed {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl FolderError {
    /// Whether the request itself was at fault rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FolderError::PayloadTooLarge { .. } | FolderError::InvalidRequest(_)
        )
    }
}
