use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported {kind} file: {filename}")]
    UnsupportedExtension { kind: &'static str, filename: String },
    #[error("No filename provided")]
    MissingFilename,
    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid composition: {0}")]
    InvalidJob(String),
    #[error("Frame rendering failed: {0}")]
    Raster(String),
    #[error("Video encoding failed: {0}")]
    Encode(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("{0}")]
    MissingApiKey(String),
    #[error("{0}")]
    InvalidRequest(String),
    /// A failure reported by the provider, already mapped to user-facing text.
    #[error("{friendly}")]
    Api { friendly: String, raw: String },
    #[error("Video generation failed: {0}")]
    JobFailed(String),
    #[error("Video generation timed out after {}", describe_wait(.0))]
    TimedOut(Duration),
    #[error("No output received from {0}")]
    EmptyOutput(&'static str),
    #[error("Failed to save generated video: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("Invalid icon size: {0}")]
    InvalidSize(u32),
    #[error("Failed to encode icon: {0}")]
    Encode(String),
    #[error("Failed to write icon: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_wait(wait: &Duration) -> String {
    let secs = wait.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Upload(UploadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upload(_) | AppError::Remote(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Pipeline(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
