use crate::error::AppError;
use crate::utils::naming;
use crate::AppState;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::path::PathBuf;
use tokio_util::io::ReaderStream;

#[derive(Deserialize)]
pub struct DownloadParams {
    token: Option<String>,
}

/// Router fallback — everything that is not the upload endpoint lands here.
/// A `GET` resolves its path to a stored name under the storage root and
/// streams the file back; anything else is a plain 404.
pub async fn download_file(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(params): Query<DownloadParams>,
) -> Result<Response, AppError> {
    if method != Method::GET {
        return Err(AppError::NotFound);
    }

    if let Some(expected) = &state.config.token_download {
        if params.token.as_deref() != Some(expected.as_str()) {
            return Err(AppError::Forbidden);
        }
    }

    let stored = stored_name_from_path(uri.path(), &state.config.url_download)
        .ok_or(AppError::NotFound)?;

    let path = resolve(&state.root, &stored).await.ok_or(AppError::NotFound)?;

    let metadata = tokio::fs::metadata(&path).await.map_err(|_| AppError::NotFound)?;
    if !metadata.is_file() {
        return Err(AppError::NotFound);
    }

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let display_name = naming::decode_original_name(&stored, &state.config.stamp).to_string();

    let file = tokio::fs::File::open(&path).await.map_err(|_| AppError::NotFound)?;
    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (header::CONTENT_TYPE, mime.to_string()),
        (header::CONTENT_LENGTH, metadata.len().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", display_name),
        ),
    ];

    Ok((StatusCode::OK, headers, body).into_response())
}

/// Extract the stored name from a request path: percent-decode, normalize
/// any leftover literal `%20`, then strip the configured download prefix
/// (or just the leading slash when no prefix is configured).
fn stored_name_from_path(path: &str, url_download: &str) -> Option<String> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let decoded = decoded.replace("%20", " ");

    let stored = if url_download.is_empty() {
        decoded.trim_start_matches('/').to_string()
    } else {
        let prefix = format!("/{}/", url_download);
        let (_, rest) = decoded.split_once(prefix.as_str())?;
        rest.to_string()
    };

    if stored.is_empty() { None } else { Some(stored) }
}

/// Canonicalize `{root}/{stored}` and make sure it did not escape the
/// storage root. Traversal attempts and dangling names both come back as
/// `None`, which the caller reports as a 404.
async fn resolve(root: &PathBuf, stored: &str) -> Option<PathBuf> {
    let candidate = root.join(stored);
    let resolved = tokio::fs::canonicalize(&candidate).await.ok()?;
    if resolved.starts_with(root) {
        Some(resolved)
    } else {
        None
    }
}
