//! Folder listing
//!
//! One-level listing always uses the `/` delimiter. Recursive enumeration for
//! folder delete/rename lives in `batch` and never goes through here.

use super::keys::normalize;
use super::types::{FileEntry, ListingPage, ProbeReport};
use super::FolderEngine;
use crate::error::{FolderError, Result};
use crate::providers::store::{ListQuery, ObjectSummary, StoreError};

/// Objects sampled by the connectivity probe.
const PROBE_SAMPLE_KEYS: i32 = 5;

impl FolderEngine {
    /// List the direct children of `prefix`: sub-folders from the store's
    /// common prefixes and files with their sizes. The folder's own marker
    /// object is left out.
    pub async fn list(&self, prefix: &str, token: Option<&str>) -> Result<ListingPage> {
        let unavailable = |source: StoreError| FolderError::BackendUnavailable {
            bucket: self.bucket().to_string(),
            source,
        };

        self.store.head_bucket().await.map_err(unavailable)?;

        let prefix = normalize(prefix);
        let query = ListQuery::one_level(&prefix, self.limits.page_size, token);
        log::debug!("listing {:?} in {}", query, self.bucket());

        let page = self.store.list_page(&query).await.map_err(unavailable)?;

        let files = page
            .objects
            .into_iter()
            .filter(|obj| obj.key != prefix)
            .map(|obj| FileEntry {
                key: obj.key,
                size: obj.size,
            })
            .collect();

        Ok(ListingPage {
            folders: page.common_prefixes,
            files,
            is_truncated: page.is_truncated,
            next_token: page.next_token.filter(|_| page.is_truncated),
        })
    }

    /// First page of every object under the raw `prefix`, markers included.
    /// Kept for the legacy `get_files` route.
    pub async fn list_raw(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        let query = ListQuery::recursive(prefix, self.limits.page_size, None);
        let page = self
            .store
            .list_page(&query)
            .await
            .map_err(|source| FolderError::BackendUnavailable {
                bucket: self.bucket().to_string(),
                source,
            })?;
        Ok(page.objects)
    }

    /// Check that the bucket answers and count a small sample of objects.
    pub async fn probe(&self) -> ProbeReport {
        if let Err(e) = self.store.head_bucket().await {
            log::warn!("bucket probe failed for {}: {}", self.bucket(), e);
            return ProbeReport {
                bucket_accessible: false,
                sample_objects: None,
                error: Some(e.to_string()),
            };
        }

        let query = ListQuery::recursive("", PROBE_SAMPLE_KEYS, None);
        match self.store.list_page(&query).await {
            Ok(page) => ProbeReport {
                bucket_accessible: true,
                sample_objects: Some(page.objects.len()),
                error: None,
            },
            Err(e) => ProbeReport {
                bucket_accessible: false,
                sample_objects: None,
                error: Some(e.to_string()),
            },
        }
    }
}
