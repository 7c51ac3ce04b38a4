use super::types::{request_error, S3Store};
use crate::providers::store::{StoreError, StoreResult, MAX_BATCH_DELETE};
use aws_sdk_s3::types::{Delete, ObjectIdentifier};

pub async fn delete_object(store: &S3Store, key: &str) -> StoreResult<()> {
    store
        .client
        .delete_object()
        .bucket(&store.bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| request_error("DeleteObject", e))?;
    Ok(())
}

/// Delete a batch of keys in quiet mode.
///
/// S3 reports per-key failures inside a successful response; those are
/// logged and the call still counts as done.
pub async fn delete_objects(store: &S3Store, keys: &[String]) -> StoreResult<()> {
    if keys.is_empty() {
        return Ok(());
    }
    if keys.len() > MAX_BATCH_DELETE {
        return Err(StoreError::request(
            "DeleteObjects",
            format!("{} keys exceeds the limit of {}", keys.len(), MAX_BATCH_DELETE),
        ));
    }

    let objects = keys
        .iter()
        .map(|key| ObjectIdentifier::builder().key(key).build())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::request("DeleteObjects", e.to_string()))?;

    let delete = Delete::builder()
        .set_objects(Some(objects))
        .quiet(true)
        .build()
        .map_err(|e| StoreError::request("DeleteObjects", e.to_string()))?;

    let response = store
        .client
        .delete_objects()
        .bucket(&store.bucket)
        .delete(delete)
        .send()
        .await
        .map_err(|e| request_error("DeleteObjects", e))?;

    for failure in response.errors() {
        log::warn!(
            "DeleteObjects left {} in {}: {} {}",
            failure.key().unwrap_or("<unknown>"),
            store.bucket,
            failure.code().unwrap_or("unknown"),
            failure.message().unwrap_or_default()
        );
    }

    Ok(())
}

pub async fn copy_object(store: &S3Store, source_key: &str, dest_key: &str) -> StoreResult<()> {
    let copy_source = format!("{}/{}", store.bucket, urlencoding::encode(source_key));

    store
        .client
        .copy_object()
        .bucket(&store.bucket)
        .copy_source(copy_source)
        .key(dest_key)
        .send()
        .await
        .map_err(|e| request_error("CopyObject", e))?;

    Ok(())
}
