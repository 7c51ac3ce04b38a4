//! Object-store capability consumed by the folder engine.
//!
//! The engine only ever talks to a bucket through [`ObjectStore`]; the S3
//! client, the in-memory store and the deadline decorator all implement it.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Maximum number of keys S3 accepts in one `DeleteObjects` call.
pub const MAX_BATCH_DELETE: usize = 1000;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("bucket {bucket} is not accessible: {message}")]
    BucketUnavailable { bucket: String, message: String },

    #[error("{operation} failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl StoreError {
    pub fn request(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::Request {
            operation,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
}

/// One page of a `ListObjectsV2`-style query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub objects: Vec<ObjectSummary>,
    pub common_prefixes: Vec<String>,
    pub is_truncated: bool,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub prefix: String,
    pub delimiter: Option<String>,
    pub max_keys: i32,
    pub continuation_token: Option<String>,
}

impl ListQuery {
    /// One hierarchy level under `prefix`, split on `/`.
    pub fn one_level(prefix: &str, max_keys: i32, token: Option<&str>) -> Self {
        Self {
            prefix: prefix.to_string(),
            delimiter: Some("/".to_string()),
            max_keys,
            continuation_token: token.map(str::to_string),
        }
    }

    /// Every object under `prefix`, no delimiter.
    pub fn recursive(prefix: &str, max_keys: i32, token: Option<&str>) -> Self {
        Self {
            prefix: prefix.to_string(),
            delimiter: None,
            max_keys,
            continuation_token: token.map(str::to_string),
        }
    }
}

/// Key-value access to a single named bucket.
///
/// Deleting a missing key is not an error, and `put_object`/`copy_object`
/// overwrite whatever is at the destination.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;

    async fn head_bucket(&self) -> StoreResult<()>;

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()>;

    async fn list_page(&self, query: &ListQuery) -> StoreResult<ObjectPage>;

    async fn delete_object(&self, key: &str) -> StoreResult<()>;

    async fn copy_object(&self, source_key: &str, dest_key: &str) -> StoreResult<()>;

    /// Delete up to [`MAX_BATCH_DELETE`] keys in one call (quiet mode).
    async fn delete_objects(&self, keys: &[String]) -> StoreResult<()>;
}
