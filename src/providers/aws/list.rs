use super::types::{describe_sdk_error, request_error, S3Store};
use crate::providers::store::{ListQuery, ObjectPage, ObjectSummary, StoreError, StoreResult};

pub async fn head_bucket(store: &S3Store) -> StoreResult<()> {
    store
        .client
        .head_bucket()
        .bucket(&store.bucket)
        .send()
        .await
        .map_err(|e| StoreError::BucketUnavailable {
            bucket: store.bucket.clone(),
            message: describe_sdk_error(&e),
        })?;
    Ok(())
}

/// Fetch one `ListObjectsV2` page. Folder markers are kept; callers decide
/// whether to hide them.
pub async fn list_page(store: &S3Store, query: &ListQuery) -> StoreResult<ObjectPage> {
    let mut request = store
        .client
        .list_objects_v2()
        .bucket(&store.bucket)
        .max_keys(query.max_keys);

    if !query.prefix.is_empty() {
        request = request.prefix(&query.prefix);
    }
    if let Some(d) = &query.delimiter {
        request = request.delimiter(d);
    }
    if let Some(token) = &query.continuation_token {
        request = request.continuation_token(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| request_error("ListObjectsV2", e))?;

    let objects = response
        .contents()
        .iter()
        .filter_map(|obj| {
            let key = obj.key()?.to_string();
            Some(ObjectSummary {
                key,
                size: obj.size().unwrap_or(0),
                last_modified: obj.last_modified().map(|dt| dt.to_string()),
                etag: obj.e_tag().map(str::to_string),
            })
        })
        .collect();

    let common_prefixes = response
        .common_prefixes()
        .iter()
        .filter_map(|prefix| prefix.prefix().map(|s| s.to_string()))
        .collect();

    Ok(ObjectPage {
        objects,
        common_prefixes,
        is_truncated: response.is_truncated().unwrap_or(false),
        next_token: response.next_continuation_token().map(|s| s.to_string()),
    })
}
