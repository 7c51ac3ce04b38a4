//! HTTP API layer

mod http;

pub use http::{router, ApiError, AppState, HttpServer};
