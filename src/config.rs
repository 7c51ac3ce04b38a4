//! Service configuration
//!
//! Everything is read once at startup from flags or the environment and is
//! never mutated afterwards.

use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::providers::store::MAX_BATCH_DELETE;

/// 20 MiB upload cap.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Keys requested per listing page.
pub const DEFAULT_PAGE_SIZE: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Amazon S3 or an S3-compatible endpoint
    S3,
    /// In-process map; contents are lost on exit
    Memory,
}

/// HTTP facade that presents folders over an S3 bucket
#[derive(Debug, Clone, Parser)]
#[command(name = "s3-folders")]
#[command(author, version, about, long_about = None)]
pub struct ServiceConfig {
    /// Address the HTTP API listens on
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8000")]
    pub bind_address: String,

    /// Bucket every operation runs against
    #[arg(long, env = "S3_BUCKET")]
    pub bucket: String,

    /// AWS region of the bucket
    #[arg(long, env = "AWS_REGION", default_value = "us-west-2")]
    pub region: String,

    /// Static access key; falls back to the default provider chain when unset
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[arg(long, env = "S3_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    #[arg(long, env = "S3_FORCE_PATH_STYLE")]
    pub force_path_style: bool,

    /// Deadline applied to every individual store call
    #[arg(long, env = "STORE_TIMEOUT_SECS", default_value_t = 30)]
    pub store_timeout_secs: u64,

    /// Largest accepted upload in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    #[arg(long, env = "STORAGE_BACKEND", value_enum, default_value_t = Backend::S3)]
    pub backend: Backend,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl ServiceConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_upload_bytes: self.max_upload_bytes,
            ..Limits::default()
        }
    }
}

/// Static bounds the folder engine works within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_upload_bytes: usize,
    /// Keys per batch-delete call; never above what the store accepts.
    pub batch_limit: usize,
    pub page_size: i32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            batch_limit: MAX_BATCH_DELETE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_limits() {
        let config =
            ServiceConfig::try_parse_from(["s3-folders", "--bucket", "media"]).unwrap();

        assert_eq!(config.bucket, "media");
        assert_eq!(config.bind_address, "0.0.0.0:8000");
        assert_eq!(config.backend, Backend::S3);
        assert_eq!(config.store_timeout(), Duration::from_secs(30));
        assert_eq!(config.limits(), Limits::default());
        assert_eq!(Limits::default().max_upload_bytes, 20_971_520);
        assert_eq!(Limits::default().batch_limit, 1000);
    }

    #[test]
    fn memory_backend_and_upload_cap_are_configurable() {
        let config = ServiceConfig::try_parse_from([
            "s3-folders",
            "--bucket",
            "media",
            "--backend",
            "memory",
            "--max-upload-bytes",
            "1024",
        ])
        .unwrap();

        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.limits().max_upload_bytes, 1024);
        assert_eq!(config.limits().page_size, 1000);
    }
}
