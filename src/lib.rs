//! Virtual folders over a single S3 bucket, served over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod folders;
pub mod providers;

pub use config::{Limits, ServiceConfig};
pub use error::{FolderError, Result};
pub use folders::FolderEngine;
