//! Per-call deadline for any [`ObjectStore`].
//!
//! Folder operations run many store calls back to back; a single hung call
//! would otherwise stall the whole request forever.

use crate::providers::store::{ListQuery, ObjectPage, ObjectStore, StoreError, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct DeadlineStore {
    inner: Arc<dyn ObjectStore>,
    timeout: Duration,
}

impl DeadlineStore {
    pub fn new(inner: Arc<dyn ObjectStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>> + Send,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!(
                    "{} on bucket {} exceeded {:?}",
                    operation,
                    self.inner.bucket(),
                    self.timeout
                );
                Err(StoreError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl ObjectStore for DeadlineStore {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn head_bucket(&self) -> StoreResult<()> {
        self.bounded("HeadBucket", self.inner.head_bucket()).await
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()> {
        self.bounded("PutObject", self.inner.put_object(key, body, content_type))
            .await
    }

    async fn list_page(&self, query: &ListQuery) -> StoreResult<ObjectPage> {
        self.bounded("ListObjectsV2", self.inner.list_page(query)).await
    }

    async fn delete_object(&self, key: &str) -> StoreResult<()> {
        self.bounded("DeleteObject", self.inner.delete_object(key)).await
    }

    async fn copy_object(&self, source_key: &str, dest_key: &str) -> StoreResult<()> {
        self.bounded("CopyObject", self.inner.copy_object(source_key, dest_key))
            .await
    }

    async fn delete_objects(&self, keys: &[String]) -> StoreResult<()> {
        self.bounded("DeleteObjects", self.inner.delete_objects(keys))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::memory::MemoryStore;

    struct HangingStore;

    #[async_trait]
    impl ObjectStore for HangingStore {
        fn bucket(&self) -> &str {
            "hanging"
        }

        async fn head_bucket(&self) -> StoreResult<()> {
            std::future::pending().await
        }

        async fn put_object(&self, _: &str, _: Bytes, _: &str) -> StoreResult<()> {
            std::future::pending().await
        }

        async fn list_page(&self, _: &ListQuery) -> StoreResult<ObjectPage> {
            std::future::pending().await
        }

        async fn delete_object(&self, _: &str) -> StoreResult<()> {
            std::future::pending().await
        }

        async fn copy_object(&self, _: &str, _: &str) -> StoreResult<()> {
            std::future::pending().await
        }

        async fn delete_objects(&self, _: &[String]) -> StoreResult<()> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_call_times_out() {
        let store = DeadlineStore::new(Arc::new(HangingStore), Duration::from_secs(5));

        let err = store
            .list_page(&ListQuery::recursive("a/", 1000, None))
            .await
            .unwrap_err();

        match err {
            StoreError::Timeout { operation, after } => {
                assert_eq!(operation, "ListObjectsV2");
                assert_eq!(after, Duration::from_secs(5));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fast_calls_pass_through() {
        let inner = Arc::new(MemoryStore::new("bucket"));
        let store = DeadlineStore::new(inner.clone(), Duration::from_secs(5));

        store
            .put_object("k", Bytes::from_static(b"v"), "text/plain")
            .await
            .unwrap();

        assert_eq!(store.bucket(), "bucket");
        assert_eq!(inner.keys().await, vec!["k".to_string()]);
    }
}
