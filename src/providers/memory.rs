//! In-process object store.
//!
//! Emulates the parts of `ListObjectsV2` the folder engine relies on
//! (prefix, delimiter roll-up, max-keys, continuation tokens) over an
//! ordered map. Used for local runs without a bucket and by the tests, which
//! also inspect the recorded batch sizes and inject failures.

use crate::providers::store::{
    ListQuery, ObjectPage, ObjectStore, ObjectSummary, StoreError, StoreResult, MAX_BATCH_DELETE,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
    pub last_modified: String,
}

/// A store call that should fail instead of running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailPoint {
    HeadBucket,
    List,
    Put(String),
    Copy(String),
    Delete(String),
    /// Fail the n-th `delete_objects` attempt (1-based).
    BatchDelete(usize),
}

#[derive(Debug, Default)]
struct MemoryState {
    objects: BTreeMap<String, StoredObject>,
    batch_sizes: Vec<usize>,
    batch_calls: usize,
    writes: usize,
    failures: Vec<FailPoint>,
}

impl MemoryState {
    fn check(&self, point: &FailPoint, operation: &'static str) -> StoreResult<()> {
        if self.failures.contains(point) {
            return Err(StoreError::request(operation, "injected failure"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    bucket: String,
    state: Mutex<MemoryState>,
}

enum Entry<'a> {
    Object(&'a str, &'a StoredObject),
    Prefix(String),
}

impl Entry<'_> {
    fn token(&self) -> String {
        match self {
            Entry::Object(key, _) => format!("k:{}", key),
            Entry::Prefix(prefix) => format!("p:{}", prefix),
        }
    }
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Seed objects directly, bypassing the write counter.
    pub async fn insert(&self, key: &str, body: impl Into<Bytes>) {
        let mut state = self.state.lock().await;
        state.objects.insert(
            key.to_string(),
            StoredObject {
                body: body.into(),
                content_type: "application/octet-stream".to_string(),
                last_modified: chrono::Utc::now().to_rfc3339(),
            },
        );
    }

    pub async fn fail_on(&self, point: FailPoint) {
        self.state.lock().await.failures.push(point);
    }

    pub async fn keys(&self) -> Vec<String> {
        self.state.lock().await.objects.keys().cloned().collect()
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.state.lock().await.objects.get(key).cloned()
    }

    /// Sizes of every successful `delete_objects` call, in order.
    pub async fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().await.batch_sizes.clone()
    }

    /// Number of `put_object` and `copy_object` calls that wrote data.
    pub async fn writes(&self) -> usize {
        self.state.lock().await.writes
    }
}

fn resume_after(token: &str, key: &str) -> bool {
    match token.split_once(':') {
        Some(("k", last)) => key > last,
        Some(("p", prefix)) => key > prefix && !key.starts_with(prefix),
        _ => true,
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn head_bucket(&self) -> StoreResult<()> {
        let state = self.state.lock().await;
        if state.failures.contains(&FailPoint::HeadBucket) {
            return Err(StoreError::BucketUnavailable {
                bucket: self.bucket.clone(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.check(&FailPoint::Put(key.to_string()), "PutObject")?;
        state.writes += 1;
        state.objects.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                last_modified: chrono::Utc::now().to_rfc3339(),
            },
        );
        Ok(())
    }

    async fn list_page(&self, query: &ListQuery) -> StoreResult<ObjectPage> {
        let state = self.state.lock().await;
        state.check(&FailPoint::List, "ListObjectsV2")?;

        if query.max_keys <= 0 {
            return Ok(ObjectPage::default());
        }
        let max_keys = query.max_keys as usize;

        let mut entries: Vec<Entry<'_>> = Vec::new();
        for (key, object) in state.objects.range(query.prefix.clone()..) {
            if !key.starts_with(&query.prefix) {
                break;
            }
            if let Some(token) = &query.continuation_token {
                if !resume_after(token, key) {
                    continue;
                }
            }

            let rest = &key[query.prefix.len()..];
            let rolled_up = query.delimiter.as_deref().and_then(|d| {
                rest.find(d)
                    .map(|idx| format!("{}{}", query.prefix, &rest[..idx + d.len()]))
            });

            match rolled_up {
                Some(prefix) => {
                    let repeated = matches!(entries.last(), Some(Entry::Prefix(p)) if *p == prefix);
                    if !repeated {
                        entries.push(Entry::Prefix(prefix));
                    }
                }
                None => entries.push(Entry::Object(key, object)),
            }

            if entries.len() > max_keys {
                break;
            }
        }

        let is_truncated = entries.len() > max_keys;
        entries.truncate(max_keys);
        let next_token = if is_truncated {
            entries.last().map(Entry::token)
        } else {
            None
        };

        let mut page = ObjectPage {
            is_truncated,
            next_token,
            ..ObjectPage::default()
        };
        for entry in entries {
            match entry {
                Entry::Object(key, object) => page.objects.push(ObjectSummary {
                    key: key.to_string(),
                    size: object.body.len() as i64,
                    last_modified: Some(object.last_modified.clone()),
                    etag: None,
                }),
                Entry::Prefix(prefix) => page.common_prefixes.push(prefix),
            }
        }

        Ok(page)
    }

    async fn delete_object(&self, key: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.check(&FailPoint::Delete(key.to_string()), "DeleteObject")?;
        state.objects.remove(key);
        Ok(())
    }

    async fn copy_object(&self, source_key: &str, dest_key: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.check(&FailPoint::Copy(source_key.to_string()), "CopyObject")?;
        let mut object = state.objects.get(source_key).cloned().ok_or_else(|| {
            StoreError::request("CopyObject", format!("NoSuchKey: {}", source_key))
        })?;
        object.last_modified = chrono::Utc::now().to_rfc3339();
        state.writes += 1;
        state.objects.insert(dest_key.to_string(), object);
        Ok(())
    }

    async fn delete_objects(&self, keys: &[String]) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if keys.len() > MAX_BATCH_DELETE {
            return Err(StoreError::request(
                "DeleteObjects",
                format!("{} keys exceeds the limit of {}", keys.len(), MAX_BATCH_DELETE),
            ));
        }
        state.batch_calls += 1;
        let call = state.batch_calls;
        state.check(&FailPoint::BatchDelete(call), "DeleteObjects")?;
        state.batch_sizes.push(keys.len());
        for key in keys {
            state.objects.remove(key);
        }
        Ok(())
    }
}
