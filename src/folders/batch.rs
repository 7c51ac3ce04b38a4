//! Recursive folder delete and rename.
//!
//! Both walk every object under a prefix with delimiter-less pages, one page
//! at a time, and delete in batches of at most `Limits::batch_limit` keys.
//! Neither is transactional: an error aborts the walk and whatever was
//! already copied or deleted stays that way. Re-running the operation is
//! the recovery path, since copies overwrite and deleting a missing key
//! succeeds.

use super::keys::{normalize, remap_key};
use super::types::{FolderDeleted, FolderRenamed};
use super::FolderEngine;
use crate::error::{FolderError, Result};
use crate::providers::store::{ListQuery, ObjectPage, StoreResult};

impl FolderEngine {
    /// Fetch one recursive page under `prefix`.
    async fn recursive_page(&self, prefix: &str, token: Option<&str>) -> StoreResult<ObjectPage> {
        let query = ListQuery::recursive(prefix, self.limits.page_size, token);
        self.store.list_page(&query).await
    }

    /// Delete every object whose key starts with `normalize(prefix)`.
    ///
    /// An empty prefix is the bucket root, so it empties the bucket.
    pub async fn delete_folder(&self, prefix: &str) -> Result<FolderDeleted> {
        let prefix = normalize(prefix);
        let batch_failed = |source| FolderError::BatchDeleteFailed {
            prefix: prefix.clone(),
            source,
        };

        if prefix.is_empty() {
            log::warn!("deleting every object in bucket {}", self.bucket());
        }

        let mut token: Option<String> = None;
        let mut total = 0usize;

        loop {
            let page = self
                .recursive_page(&prefix, token.as_deref())
                .await
                .map_err(batch_failed)?;

            let keys: Vec<String> = page.objects.into_iter().map(|obj| obj.key).collect();

            for chunk in keys.chunks(self.limits.batch_limit) {
                self.store
                    .delete_objects(chunk)
                    .await
                    .map_err(batch_failed)?;
                total += chunk.len();
                log::debug!("deleted {} keys under {} ({} so far)", chunk.len(), prefix, total);
            }

            token = page.next_token;
            if token.is_none() {
                break;
            }
        }

        log::info!("deleted folder {} ({} objects) from {}", prefix, total, self.bucket());
        Ok(FolderDeleted {
            deleted_count: total,
        })
    }

    /// Move every object under `old_prefix` to the same relative path under
    /// `new_prefix`.
    ///
    /// Each object is copied as soon as it is listed and queued for deletion;
    /// the queue is flushed whenever it reaches the batch limit and once more
    /// at the end. The returned count is of copies made.
    pub async fn rename_folder(&self, old_prefix: &str, new_prefix: &str) -> Result<FolderRenamed> {
        let old_p = normalize(old_prefix);
        let new_p = normalize(new_prefix);

        if old_p == new_p {
            return Ok(FolderRenamed { objects_renamed: 0 });
        }
        // The walk would pick up its own copies.
        if new_p.starts_with(&old_p) {
            return Err(FolderError::InvalidRequest(format!(
                "cannot move folder {:?} into itself ({:?})",
                old_p, new_p
            )));
        }

        let rename_failed = |source| FolderError::RenameFailed {
            from: old_p.clone(),
            to: new_p.clone(),
            source,
        };

        let mut token: Option<String> = None;
        let mut pending: Vec<String> = Vec::with_capacity(self.limits.batch_limit);
        let mut total_copied = 0usize;

        loop {
            let page = self
                .recursive_page(&old_p, token.as_deref())
                .await
                .map_err(rename_failed)?;

            for obj in page.objects {
                let dst_key = remap_key(&obj.key, &old_p, &new_p);
                self.store
                    .copy_object(&obj.key, &dst_key)
                    .await
                    .map_err(rename_failed)?;
                total_copied += 1;
                pending.push(obj.key);

                if pending.len() >= self.limits.batch_limit {
                    self.store
                        .delete_objects(&pending)
                        .await
                        .map_err(rename_failed)?;
                    pending.clear();
                }
            }

            token = page.next_token;
            if token.is_none() {
                break;
            }
        }

        if !pending.is_empty() {
            self.store
                .delete_objects(&pending)
                .await
                .map_err(rename_failed)?;
        }

        log::info!(
            "renamed folder {} to {} ({} objects) in {}",
            old_p,
            new_p,
            total_copied,
            self.bucket()
        );
        Ok(FolderRenamed {
            objects_renamed: total_copied,
        })
    }
}
