pub mod config;
pub mod error;
pub mod handlers;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::ServerConfig;
use axum::extract::DefaultBodyLimit;
use axum::routing::put;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Canonicalized storage directory; all stored names resolve below it.
    pub root: PathBuf,
}

pub fn create_app(state: AppState) -> Router {
    let upload_path = format!("/{}", state.config.url_upload);

    Router::new()
        .route(&upload_path, put(handlers::upload::upload_file))
        .fallback(handlers::download::download_file)
        // Uploads are streamed to disk, never buffered whole, so the
        // default in-memory body cap does not apply.
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
