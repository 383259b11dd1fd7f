use crate::error::AppError;
use crate::services::compression;
use crate::utils::naming;
use crate::AppState;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use futures::TryStreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

/// `PUT /{urlUpload}` — stream every `file` part of the multipart body to
/// disk under a freshly generated stored name and answer with the JSON
/// array of those names, in arrival order.
///
/// Compression, when requested, is spawned as a detached task per stored
/// image; the response never waits for it.
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Vec<String>>, AppError> {
    // Token gate runs before a single multipart byte is consumed, so a
    // rejected request leaves no file behind.
    if let Some(expected) = &state.config.token_upload {
        if header_value(&headers, "token") != Some(expected.as_str()) {
            return Err(AppError::Forbidden);
        }
    }

    let webp = header_flag(&headers, "webp");
    let compress = header_flag(&headers, "compress");
    let resize = header_flag(&headers, "resize");
    let level_header = header_value(&headers, "level").map(str::to_owned);

    let mut stored_names: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or("unnamed").to_string();

        let now_millis = Utc::now().timestamp_millis();
        let mut stored =
            naming::generate_stored_name(&original, now_millis, &state.config.stamp, |candidate| {
                state.root.join(candidate).exists()
            });

        // The name is fixed now, before any pixels are rewritten: the
        // client must learn the final name even though the WebP transcode
        // itself only happens in the compression task later.
        if webp && naming::has_image_extension(&stored) {
            stored = naming::rewrite_extension_to_webp(&stored);
        }

        let dest = state.root.join(&stored);
        let mut reader =
            StreamReader::new(field.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)));
        let mut file = tokio::fs::File::create(&dest).await?;
        tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;

        tracing::info!("Stored {} as {}", original, stored);
        stored_names.push(stored);
    }

    // Late validation, after the parts are already on disk: an out-of-range
    // level fails the request but does not roll back written files.
    let mut level: u8 = 0;
    if let Some(raw) = level_header.filter(|s| !s.trim().is_empty()) {
        match raw.trim().parse::<i64>() {
            Ok(v) if (0..=10).contains(&v) => level = v as u8,
            _ => return Err(AppError::LevelOutOfRange(raw)),
        }
    }

    if compress {
        for name in stored_names.iter().filter(|n| naming::has_image_extension(n)) {
            let path = state.root.join(name);
            tokio::spawn(async move {
                if let Err(e) = compression::compress_in_place(&path, level, resize).await {
                    tracing::error!("Compression failed for {}: {}", path.display(), e);
                }
            });
        }
    }

    Ok(Json(stored_names))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Flag headers are truthy when present with any non-empty value.
fn header_flag(headers: &HeaderMap, name: &str) -> bool {
    header_value(headers, name).is_some_and(|v| !v.is_empty())
}
