use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("token missing or mismatched")]
    Forbidden,

    #[error("invalid level: {0}")]
    LevelOutOfRange(String),

    #[error("not found")]
    NotFound,

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The wire contract of this service is plain text for all failures.
        let (status, message) = match self {
            AppError::Forbidden => (StatusCode::FORBIDDEN, "You do not have access".to_string()),
            AppError::LevelOutOfRange(_) => (
                StatusCode::GONE,
                "The level must be an integer between 0 and 10".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "404".to_string()),
            AppError::Multipart(e) => {
                tracing::warn!("Malformed multipart body: {}", e);
                (StatusCode::BAD_REQUEST, "Bad Request".to_string())
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
