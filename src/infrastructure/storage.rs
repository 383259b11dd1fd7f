use crate::config::ServerConfig;
use std::path::PathBuf;
use tracing::info;

/// Make sure the storage directory exists and return its canonical path.
/// Every stored-name lookup is resolved against this root, so it has to be
/// canonical for the containment check in the download handler to hold.
pub async fn setup_storage(config: &ServerConfig) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(&config.directory).await?;
    let root = tokio::fs::canonicalize(&config.directory).await?;

    info!("📁 Storage directory: {}", root.display());
    Ok(root)
}
