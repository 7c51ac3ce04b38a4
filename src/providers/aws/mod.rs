//! S3 backend for the object-store capability.
//!
//! - `types`: the store handle and SDK error rendering
//! - `list`: bucket probe and `ListObjectsV2` pages
//! - `objects`: delete, batch delete, copy
//! - `upload`: single PUT

mod list;
mod objects;
mod types;
mod upload;

pub use types::S3Store;

use crate::providers::store::{ListQuery, ObjectPage, ObjectStore, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn head_bucket(&self) -> StoreResult<()> {
        list::head_bucket(self).await
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()> {
        upload::put_object(self, key, body, content_type).await
    }

    async fn list_page(&self, query: &ListQuery) -> StoreResult<ObjectPage> {
        list::list_page(self, query).await
    }

    async fn delete_object(&self, key: &str) -> StoreResult<()> {
        objects::delete_object(self, key).await
    }

    async fn copy_object(&self, source_key: &str, dest_key: &str) -> StoreResult<()> {
        objects::copy_object(self, source_key, dest_key).await
    }

    async fn delete_objects(&self, keys: &[String]) -> StoreResult<()> {
        objects::delete_objects(self, keys).await
    }
}
