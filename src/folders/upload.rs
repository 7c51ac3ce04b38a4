use super::keys::{normalize, strip_leading_slash};
use super::types::{FolderCreated, UploadOutcome};
use super::FolderEngine;
use crate::error::{FolderError, Result};
use bytes::Bytes;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Key an upload lands at: the normalized prefix plus the override name (or
/// the client's file name), with leading slashes removed.
pub fn upload_key(prefix: &str, filename_override: Option<&str>, original_filename: &str) -> String {
    let name = filename_override
        .filter(|name| !name.is_empty())
        .unwrap_or(original_filename);
    strip_leading_slash(&format!("{}{}", normalize(prefix), name)).to_string()
}

impl FolderEngine {
    /// Store `content` as one object. Size is checked before any store call;
    /// an existing object at the derived key is overwritten.
    pub async fn upload(
        &self,
        content: Bytes,
        prefix: &str,
        filename_override: Option<&str>,
        original_filename: &str,
        content_type: Option<&str>,
    ) -> Result<UploadOutcome> {
        if content.len() > self.limits.max_upload_bytes {
            return Err(FolderError::PayloadTooLarge {
                size: content.len(),
                limit: self.limits.max_upload_bytes,
            });
        }

        let key = upload_key(prefix, filename_override, original_filename);
        if key.is_empty() {
            return Err(FolderError::InvalidRequest(
                "upload needs a file name".to_string(),
            ));
        }

        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let size = content.len();

        self.store
            .put_object(&key, content, content_type)
            .await
            .map_err(|source| FolderError::WriteFailed {
                key: key.clone(),
                source,
            })?;

        log::info!("uploaded {} ({} bytes) to {}", key, size, self.bucket());
        Ok(UploadOutcome { key })
    }

    /// Write the zero-byte marker that makes an empty folder visible.
    pub async fn create_folder(&self, folder_name: &str) -> Result<FolderCreated> {
        let folder = normalize(folder_name);
        if folder.is_empty() {
            return Err(FolderError::InvalidRequest(
                "folder name must not be empty".to_string(),
            ));
        }

        self.store
            .put_object(&folder, Bytes::new(), DEFAULT_CONTENT_TYPE)
            .await
            .map_err(|source| FolderError::WriteFailed {
                key: folder.clone(),
                source,
            })?;

        log::info!("created folder marker {} in {}", folder, self.bucket());
        Ok(FolderCreated { folder })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folders::test_support::engine_with;
    use crate::providers::memory::FailPoint;

    #[test]
    fn key_derivation_prefers_non_empty_override() {
        assert_eq!(upload_key("assets", None, "a.png"), "assets/a.png");
        assert_eq!(upload_key("assets/", Some("b.png"), "a.png"), "assets/b.png");
        assert_eq!(upload_key("assets", Some(""), "a.png"), "assets/a.png");
        assert_eq!(upload_key("", None, "a.png"), "a.png");
        assert_eq!(upload_key("/", None, "a.png"), "a.png");
        assert_eq!(upload_key("", Some("/x/y.txt"), "a.png"), "x/y.txt");
    }

    #[tokio::test]
    async fn upload_writes_one_object_with_content_type() {
        let (engine, store) = engine_with(&[]).await;

        let outcome = engine
            .upload(
                Bytes::from_static(b"hello"),
                "docs",
                None,
                "hi.txt",
                Some("text/plain"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.key, "docs/hi.txt");
        let stored = store.get("docs/hi.txt").await.unwrap();
        assert_eq!(stored.body, Bytes::from_static(b"hello"));
        assert_eq!(stored.content_type, "text/plain");
        assert_eq!(store.writes().await, 1);
    }

    #[tokio::test]
    async fn missing_content_type_defaults_to_octet_stream() {
        let (engine, store) = engine_with(&[]).await;

        engine
            .upload(Bytes::from_static(b"x"), "", None, "blob", None)
            .await
            .unwrap();

        assert_eq!(store.get("blob").await.unwrap().content_type, DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn existing_object_is_overwritten() {
        let (engine, store) = engine_with(&["docs/hi.txt"]).await;

        engine
            .upload(Bytes::from_static(b"new"), "docs", None, "hi.txt", None)
            .await
            .unwrap();

        assert_eq!(store.get("docs/hi.txt").await.unwrap().body, Bytes::from_static(b"new"));
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected_before_any_write() {
        let (engine, store) = engine_with(&[]).await;
        let content = Bytes::from(vec![0u8; 20 * 1024 * 1024 + 1]);

        let err = engine
            .upload(content, "big", None, "file.bin", None)
            .await
            .unwrap_err();

        assert!(matches!(err, FolderError::PayloadTooLarge { size, limit }
            if size == 20 * 1024 * 1024 + 1 && limit == 20 * 1024 * 1024));
        assert_eq!(store.writes().await, 0);
        assert!(store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn payload_at_the_cap_is_accepted() {
        let (engine, store) = engine_with(&[]).await;
        let content = Bytes::from(vec![0u8; 20 * 1024 * 1024]);

        engine.upload(content, "", None, "edge.bin", None).await.unwrap();

        assert_eq!(store.writes().await, 1);
    }

    #[tokio::test]
    async fn empty_key_is_invalid() {
        let (engine, store) = engine_with(&[]).await;

        let err = engine
            .upload(Bytes::from_static(b"x"), "", None, "", None)
            .await
            .unwrap_err();

        assert!(matches!(err, FolderError::InvalidRequest(_)));
        assert_eq!(store.writes().await, 0);
    }

    #[tokio::test]
    async fn store_failure_is_write_failed() {
        let (engine, store) = engine_with(&[]).await;
        store.fail_on(FailPoint::Put("a/b".into())).await;

        let err = engine
            .upload(Bytes::from_static(b"x"), "a", None, "b", None)
            .await
            .unwrap_err();

        assert!(matches!(err, FolderError::WriteFailed { ref key, .. } if key == "a/b"));
    }

    #[tokio::test]
    async fn create_folder_writes_empty_marker() {
        let (engine, store) = engine_with(&[]).await;

        let created = engine.create_folder("reports/2024").await.unwrap();

        assert_eq!(created.folder, "reports/2024/");
        let marker = store.get("reports/2024/").await.unwrap();
        assert!(marker.body.is_empty());

        let page = engine.list("reports/2024", None).await.unwrap();
        assert!(page.files.is_empty());
    }

    #[tokio::test]
    async fn create_folder_rejects_empty_name() {
        let (engine, _) = engine_with(&[]).await;
        assert!(matches!(
            engine.create_folder("").await,
            Err(FolderError::InvalidRequest(_))
        ));
    }
}
