use super::types::{request_error, S3Store};
use crate::providers::store::StoreResult;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

/// Single PUT; the body is already capped by the caller.
pub async fn put_object(
    store: &S3Store,
    key: &str,
    body: Bytes,
    content_type: &str,
) -> StoreResult<()> {
    store
        .client
        .put_object()
        .bucket(&store.bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| request_error("PutObject", e))?;

    Ok(())
}
