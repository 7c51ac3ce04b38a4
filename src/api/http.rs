//! HTTP API Server
//!
//! Thin axum routes over the folder engine; each route maps to exactly one
//! engine operation.

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Json, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::FolderError;
use crate::folders::{FolderEngine, ListingPage};
use crate::providers::store::ObjectSummary;

/// Room for multipart boundaries and the text fields on top of the file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: FolderEngine,
    /// Reported by the connectivity test only
    pub region: String,
}

/// HTTP API server
pub struct HttpServer {
    bind_address: String,
    state: AppState,
}

impl HttpServer {
    pub fn new(bind_address: impl Into<String>, state: AppState) -> Self {
        Self {
            bind_address: bind_address.into(),
            state,
        }
    }

    /// Serve until `shutdown` resolves.
    pub async fn start(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let app = router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;
        tracing::info!("HTTP API listening on {}", self.bind_address);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

/// Create the router
pub fn router(state: AppState) -> Router {
    let body_limit = state.engine.limits().max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(handle_health))
        .route("/s3/test", get(handle_test_connection))
        .route("/s3/upload", post(handle_upload))
        .route("/s3/list", get(handle_list))
        .route("/s3/object", delete(handle_delete_object))
        .route("/s3/folder", delete(handle_delete_folder).post(handle_create_folder))
        .route("/s3/object/rename", put(handle_rename_object))
        .route("/s3/folder/rename", put(handle_rename_folder))
        // Legacy routes
        .route("/s3/get_files/:folder_name", get(handle_get_files_legacy))
        .route("/s3/upload_file", post(handle_upload_file_legacy))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ Errors ============

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    Folder(FolderError),
    Multipart(MultipartError),
}

impl From<FolderError> for ApiError {
    fn from(e: FolderError) -> Self {
        ApiError::Folder(e)
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Multipart(e)
    }
}

fn folder_error_status(e: &FolderError) -> StatusCode {
    match e {
        FolderError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        FolderError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        FolderError::BackendUnavailable { .. }
        | FolderError::RenameFailed { .. }
        | FolderError::BatchDeleteFailed { .. }
        | FolderError::WriteFailed { .. }
        | FolderError::DeleteFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Folder(e) => {
                let status = folder_error_status(&e);
                if e.is_client_error() {
                    tracing::debug!("rejected request: {}", e);
                } else {
                    tracing::error!("{}", e);
                }
                (status, e.to_string())
            }
            ApiError::Multipart(e) => (e.status(), e.body_text()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub prefix: String,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeyParams {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct PrefixParams {
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct FolderRequest {
    pub folder_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameObjectRequest {
    pub old_key: String,
    pub new_key: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameFolderRequest {
    pub old_prefix: String,
    pub new_prefix: String,
}

/// Object shape returned by the legacy `get_files` route.
#[derive(Debug, Serialize)]
pub struct LegacyObject {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Size")]
    pub size: i64,
    #[serde(rename = "LastModified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(rename = "ETag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl From<ObjectSummary> for LegacyObject {
    fn from(obj: ObjectSummary) -> Self {
        Self {
            key: obj.key,
            size: obj.size,
            last_modified: obj.last_modified,
            etag: obj.etag,
        }
    }
}

/// Parts of an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    prefix: String,
    filename: Option<String>,
    file: Option<UploadedFile>,
}

#[derive(Debug)]
struct UploadedFile {
    name: String,
    content_type: Option<String>,
    content: Bytes,
}

async fn read_upload_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let content = field.bytes().await?;
                form.file = Some(UploadedFile {
                    name,
                    content_type,
                    content,
                });
            }
            Some("prefix") => form.prefix = field.text().await?,
            Some("filename") => form.filename = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

async fn upload_form(engine: &FolderEngine, form: UploadForm) -> ApiResult<Json<Value>> {
    let file = form.file.ok_or_else(|| {
        FolderError::InvalidRequest("multipart field `file` is required".to_string())
    })?;

    let outcome = engine
        .upload(
            file.content,
            &form.prefix,
            form.filename.as_deref(),
            &file.name,
            file.content_type.as_deref(),
        )
        .await?;

    Ok(Json(json!({ "ok": true, "key": outcome.key })))
}

// ============ Handlers ============

async fn handle_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn handle_test_connection(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.engine.probe().await;
    let bucket = state.engine.bucket();

    if report.bucket_accessible {
        Json(json!({
            "status": "success",
            "bucket": bucket,
            "region": state.region,
            "bucket_accessible": true,
            "sample_objects": report.sample_objects.unwrap_or(0),
            "message": "S3 connection working properly",
        }))
    } else {
        Json(json!({
            "status": "error",
            "bucket": bucket,
            "region": state.region,
            "error": report.error,
            "bucket_accessible": false,
        }))
    }
}

async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let form = read_upload_form(multipart).await?;
    upload_form(&state.engine, form).await
}

async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ListingPage>> {
    let token = params.token.as_deref().filter(|t| !t.is_empty());
    let page = state.engine.list(&params.prefix, token).await?;
    Ok(Json(page))
}

async fn handle_delete_object(
    State(state): State<AppState>,
    Query(params): Query<KeyParams>,
) -> ApiResult<Json<Value>> {
    let result = state.engine.delete_object(&params.key).await?;
    Ok(Json(json!({ "ok": true, "deleted": result.deleted })))
}

async fn handle_delete_folder(
    State(state): State<AppState>,
    Query(params): Query<PrefixParams>,
) -> ApiResult<Json<Value>> {
    let result = state.engine.delete_folder(&params.prefix).await?;
    Ok(Json(json!({ "ok": true, "deletedCount": result.deleted_count })))
}

async fn handle_create_folder(
    State(state): State<AppState>,
    Json(request): Json<FolderRequest>,
) -> ApiResult<Json<Value>> {
    let result = state.engine.create_folder(&request.folder_name).await?;
    Ok(Json(json!({ "ok": true, "folder": result.folder })))
}

async fn handle_rename_object(
    State(state): State<AppState>,
    Json(request): Json<RenameObjectRequest>,
) -> ApiResult<Json<Value>> {
    state
        .engine
        .rename_object(&request.old_key, &request.new_key)
        .await?;
    Ok(Json(json!({
        "ok": true,
        "message": format!("Renamed {} to {}", request.old_key, request.new_key),
    })))
}

async fn handle_rename_folder(
    State(state): State<AppState>,
    Json(request): Json<RenameFolderRequest>,
) -> ApiResult<Json<Value>> {
    let result = state
        .engine
        .rename_folder(&request.old_prefix, &request.new_prefix)
        .await?;
    Ok(Json(json!({
        "ok": true,
        "message": format!("Renamed folder {} to {}", request.old_prefix, request.new_prefix),
        "objectsRenamed": result.objects_renamed,
    })))
}

async fn handle_get_files_legacy(
    State(state): State<AppState>,
    Path(folder_name): Path<String>,
) -> ApiResult<Json<Vec<LegacyObject>>> {
    let objects = state.engine.list_raw(&folder_name).await?;
    Ok(Json(objects.into_iter().map(LegacyObject::from).collect()))
}

/// Upload to the bucket root; only the `file` field is honoured.
async fn handle_upload_file_legacy(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let form = read_upload_form(multipart).await?;
    let form = UploadForm {
        prefix: String::new(),
        filename: None,
        file: form.file,
    };
    upload_form(&state.engine, form).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::providers::memory::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "folder-test-boundary";

    async fn app_with(keys: &[&str], limits: Limits) -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new("test-bucket"));
        for key in keys {
            store.insert(key, Bytes::from_static(b"data")).await;
        }
        let state = AppState {
            engine: FolderEngine::new(store.clone(), limits),
            region: "us-west-2".to_string(),
        };
        (router(state), store)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(uri: &str, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, content)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app_with(&[], Limits::default()).await;
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn list_uses_original_field_names() {
        let (app, _) = app_with(&["a/", "a/x", "a/sub/y"], Limits::default()).await;
        let request = Request::get("/s3/list?prefix=a").body(Body::empty()).unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "folders": ["a/sub/"],
                "files": [{ "Key": "a/x", "Size": 4 }],
                "isTruncated": false,
                "nextToken": null,
            })
        );
    }

    #[tokio::test]
    async fn upload_uses_prefix_and_filename_override() {
        let (app, store) = app_with(&[], Limits::default()).await;
        let request = multipart_request(
            "/s3/upload",
            &[("prefix", "docs"), ("filename", "renamed.txt")],
            Some(("original.txt", b"hello")),
        );

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "key": "docs/renamed.txt" }));
        let stored = store.get("docs/renamed.txt").await.unwrap();
        assert_eq!(stored.content_type, "text/plain");
    }

    #[tokio::test]
    async fn oversized_upload_is_413_and_writes_nothing() {
        let limits = Limits {
            max_upload_bytes: 8,
            ..Limits::default()
        };
        let (app, store) = app_with(&[], limits).await;
        let request = multipart_request("/s3/upload", &[], Some(("big.bin", b"123456789")));

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["detail"].as_str().unwrap().starts_with("File exceeds"));
        assert_eq!(store.writes().await, 0);
    }

    #[tokio::test]
    async fn upload_without_file_is_400() {
        let (app, _) = app_with(&[], Limits::default()).await;
        let request = multipart_request("/s3/upload", &[("prefix", "docs")], None);

        let (status, _) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn legacy_upload_ignores_prefix() {
        let (app, store) = app_with(&[], Limits::default()).await;
        let request = multipart_request(
            "/s3/upload_file",
            &[("prefix", "ignored")],
            Some(("root.txt", b"x")),
        );

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["key"], "root.txt");
        assert_eq!(store.keys().await, vec!["root.txt".to_string()]);
    }

    #[tokio::test]
    async fn delete_object_of_missing_key_is_ok() {
        let (app, _) = app_with(&[], Limits::default()).await;
        let request = Request::delete("/s3/object?key=gone.txt")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "deleted": "gone.txt" }));
    }

    #[tokio::test]
    async fn folder_create_rename_delete_round() {
        let (app, store) = app_with(&["old/a", "old/b/c"], Limits::default()).await;

        let (status, body) = send(
            app.clone(),
            json_request(Method::POST, "/s3/folder", json!({ "folder_name": "fresh" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "folder": "fresh/" }));

        let (status, body) = send(
            app.clone(),
            json_request(
                Method::PUT,
                "/s3/folder/rename",
                json!({ "old_prefix": "old", "new_prefix": "new" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["objectsRenamed"], 2);
        assert_eq!(body["message"], "Renamed folder old to new");

        let request = Request::delete("/s3/folder?prefix=new")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "deletedCount": 2 }));

        assert_eq!(store.keys().await, vec!["fresh/".to_string()]);
    }

    #[tokio::test]
    async fn rename_object_failure_is_500_with_detail() {
        let (app, _) = app_with(&[], Limits::default()).await;

        let (status, body) = send(
            app,
            json_request(
                Method::PUT,
                "/s3/object/rename",
                json!({ "old_key": "missing", "new_key": "other" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Failed to rename missing to other"));
    }

    #[tokio::test]
    async fn legacy_get_files_returns_raw_contents() {
        let (app, _) = app_with(&["videos/", "videos/a.mp4"], Limits::default()).await;
        let request = Request::get("/s3/get_files/videos")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        let keys: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["Key"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["videos/", "videos/a.mp4"]);
    }

    #[tokio::test]
    async fn connection_test_reports_bucket_and_region() {
        let (app, _) = app_with(&["x"], Limits::default()).await;
        let request = Request::get("/s3/test").body(Body::empty()).unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["bucket"], "test-bucket");
        assert_eq!(body["region"], "us-west-2");
        assert_eq!(body["sample_objects"], 1);
    }
}
