use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use s3_folders::api::{AppState, HttpServer};
use s3_folders::config::{Backend, ServiceConfig};
use s3_folders::folders::FolderEngine;
use s3_folders::providers::s3_client::{create_s3_client, S3ClientConfig};
use s3_folders::providers::{DeadlineStore, MemoryStore, ObjectStore, S3Store};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::parse();

    init_logging(&config.log_level);

    tracing::info!("Starting s3-folders v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bucket = %config.bucket,
        region = %config.region,
        backend = ?config.backend,
        access_key_set = config.access_key_id.as_deref().is_some_and(|k| !k.is_empty()),
        secret_key_set = config.secret_access_key.as_deref().is_some_and(|k| !k.is_empty()),
        "storage configuration"
    );

    let store = build_store(&config).await;
    let engine = FolderEngine::new(store, config.limits());

    let state = AppState {
        engine,
        region: config.region.clone(),
    };

    HttpServer::new(config.bind_address.clone(), state)
        .start(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the configured backend, with every call bounded by the store timeout.
async fn build_store(config: &ServiceConfig) -> Arc<dyn ObjectStore> {
    let inner: Arc<dyn ObjectStore> = match config.backend {
        Backend::S3 => {
            let client = create_s3_client(&S3ClientConfig {
                access_key_id: config.access_key_id.as_deref(),
                secret_access_key: config.secret_access_key.as_deref(),
                region: &config.region,
                endpoint_url: config.endpoint_url.as_deref(),
                force_path_style: config.force_path_style,
            })
            .await;
            Arc::new(S3Store::new(client, config.bucket.clone()))
        }
        Backend::Memory => {
            tracing::warn!("Using in-memory storage; objects are lost on exit");
            Arc::new(MemoryStore::new(config.bucket.clone()))
        }
    };

    Arc::new(DeadlineStore::new(inner, config.store_timeout()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
