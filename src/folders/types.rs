//! Folder engine result types
//!
//! Field names follow the JSON the HTTP layer has always returned
//! (`isTruncated`, `deletedCount`, `Key`/`Size`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Size")]
    pub size: i64,
}

/// One level of a virtual folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub folders: Vec<String>,
    pub files: Vec<FileEntry>,
    pub is_truncated: bool,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderCreated {
    pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectDeleted {
    pub deleted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDeleted {
    pub deleted_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRenamed {
    pub objects_renamed: usize,
}

/// Outcome of the storage connectivity check. Never an error; failures are
/// reported in `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub bucket_accessible: bool,
    pub sample_objects: Option<usize>,
    pub error: Option<String>,
}
