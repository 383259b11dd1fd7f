use axum::body::Body;
use axum::http::{Request, StatusCode};
use file_depot::config::ServerConfig;
use file_depot::{create_app, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_state(dir: &TempDir, token_download: Option<&str>, url_download: &str) -> AppState {
    let config = ServerConfig {
        directory: dir.path().to_path_buf(),
        token_download: token_download.map(str::to_string),
        url_download: url_download.to_string(),
        ..ServerConfig::default()
    };
    AppState {
        root: dir.path().canonicalize().unwrap(),
        config: Arc::new(config),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_download_serves_file_with_metadata() {
    let dir = TempDir::new().unwrap();
    let stored = "1700000000000_fileServer_hello.txt";
    std::fs::write(dir.path().join(stored), b"hello world").unwrap();

    let app = create_app(test_state(&dir, None, ""));
    let response = app.oneshot(get(&format!("/{stored}"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("Content-Length")
            .unwrap()
            .to_str()
            .unwrap(),
        "11"
    );
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "text/plain"
    );
    assert_eq!(
        response.headers().get("Content-Disposition").unwrap(),
        "attachment; filename=\"hello.txt\""
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"hello world");
}

#[tokio::test]
async fn test_download_name_with_spaces() {
    let dir = TempDir::new().unwrap();
    let stored = "1700000000000_fileServer_my notes.txt";
    std::fs::write(dir.path().join(stored), b"x").unwrap();

    let app = create_app(test_state(&dir, None, ""));
    let response = app
        .oneshot(get("/1700000000000_fileServer_my%20notes.txt"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("Content-Disposition").unwrap(),
        "attachment; filename=\"my notes.txt\""
    );
}

#[tokio::test]
async fn test_download_foreign_name_disposition_unchanged() {
    // A file not produced by the naming scheme keeps its own name.
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("plain.bin"), b"abc").unwrap();

    let app = create_app(test_state(&dir, None, ""));
    let response = app.oneshot(get("/plain.bin")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("Content-Disposition").unwrap(),
        "attachment; filename=\"plain.bin\""
    );
}

#[tokio::test]
async fn test_download_token_required() {
    let dir = TempDir::new().unwrap();
    let stored = "1700000000000_fileServer_hello.txt";
    std::fs::write(dir.path().join(stored), b"hello world").unwrap();

    let app = create_app(test_state(&dir, Some("secret"), ""));

    let response = app
        .clone()
        .oneshot(get(&format!("/{stored}?token=wrong")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get(&format!("/{stored}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(get(&format!("/{stored}?token=secret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_download_missing_file_is_404() {
    let dir = TempDir::new().unwrap();
    let app = create_app(test_state(&dir, None, ""));

    let response = app.oneshot(get("/does_not_exist.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_traversal_is_404() {
    let outer = TempDir::new().unwrap();
    let root = outer.path().join("uploads");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(outer.path().join("secret.txt"), b"keep out").unwrap();

    let config = ServerConfig {
        directory: root.clone(),
        ..ServerConfig::default()
    };
    let state = AppState {
        root: root.canonicalize().unwrap(),
        config: Arc::new(config),
    };
    let app = create_app(state);

    let response = app
        .oneshot(get("/%2e%2e/secret.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_get_methods_are_404() {
    let dir = TempDir::new().unwrap();
    let app = create_app(test_state(&dir, None, ""));

    let request = Request::builder()
        .method("POST")
        .uri("/anything")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_prefix_mode() {
    let dir = TempDir::new().unwrap();
    let stored = "1700000000000_fileServer_hello.txt";
    std::fs::write(dir.path().join(stored), b"hello").unwrap();

    let app = create_app(test_state(&dir, None, "files"));

    let response = app
        .clone()
        .oneshot(get(&format!("/files/{stored}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Outside the configured prefix nothing resolves.
    let response = app.oneshot(get(&format!("/{stored}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
