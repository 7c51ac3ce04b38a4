use super::types::ObjectDeleted;
use super::FolderEngine;
use crate::error::{FolderError, Result};

impl FolderEngine {
    /// Delete one object. A missing key still counts as deleted.
    pub async fn delete_object(&self, key: &str) -> Result<ObjectDeleted> {
        self.store
            .delete_object(key)
            .await
            .map_err(|source| FolderError::DeleteFailed {
                key: key.to_string(),
                source,
            })?;

        log::info!("deleted {} from {}", key, self.bucket());
        Ok(ObjectDeleted {
            deleted: key.to_string(),
        })
    }

    /// Rename one object (copy then delete).
    ///
    /// Not atomic: if the delete fails after the copy, both keys exist.
    pub async fn rename_object(&self, old_key: &str, new_key: &str) -> Result<()> {
        if old_key == new_key {
            return Ok(());
        }

        let rename_failed = |source| FolderError::RenameFailed {
            from: old_key.to_string(),
            to: new_key.to_string(),
            source,
        };

        self.store
            .copy_object(old_key, new_key)
            .await
            .map_err(rename_failed)?;
        self.store
            .delete_object(old_key)
            .await
            .map_err(rename_failed)?;

        log::info!("renamed {} to {} in {}", old_key, new_key, self.bucket());
        Ok(())
    }
}
