//! Virtual folder engine - folders over a flat key space
//!
//! This module is organized into submodules:
//! - `keys`: prefix normalization and key remapping
//! - `types`: result types returned to the HTTP layer
//! - `list`: one-level listing, legacy raw listing, connectivity probe
//! - `upload`: uploads and folder markers
//! - `objects`: single-object delete and rename
//! - `batch`: recursive folder delete and rename

pub mod keys;
mod batch;
mod list;
mod objects;
mod types;
mod upload;

pub use types::{
    FileEntry, FolderCreated, FolderDeleted, FolderRenamed, ListingPage, ObjectDeleted,
    ProbeReport, UploadOutcome,
};

use crate::config::Limits;
use crate::providers::store::ObjectStore;
use std::sync::Arc;

/// Entry point for every folder operation.
///
/// Cheap to clone; the store handle and limits are shared read-only across
/// requests.
#[derive(Clone)]
pub struct FolderEngine {
    store: Arc<dyn ObjectStore>,
    limits: Limits,
}

impl FolderEngine {
    pub fn new(store: Arc<dyn ObjectStore>, limits: Limits) -> Self {
        Self { store, limits }
    }

    pub fn bucket(&self) -> &str {
        self.store.bucket()
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }
}
