//! Annotation store server entry point.
//!
//! Boots the file-backed store API on the configured address. Logging goes
//! to stderr with an env-filter so RUST_LOG controls verbosity.

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use urlmark_core::AppConfig;
use urlmark_server::{FileStore, router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;

    let store = Arc::new(FileStore::from_config(&config));
    store.ensure_dirs().await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        notes_dir = %store.notes_dir().display(),
        drawings_dir = %store.drawings_dir().display(),
        "annotation store listening"
    );

    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install shutdown handler");
    }
}
