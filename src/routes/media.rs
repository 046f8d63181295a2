use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::uploads;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/download_video/:filename", get(download_video))
        .route("/preview_video/:filename", get(preview_video))
}

async fn download_video(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    serve_video(&state, &filename, true).await
}

async fn preview_video(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    serve_video(&state, &filename, false).await
}

async fn serve_video(
    state: &AppState,
    filename: &str,
    as_attachment: bool,
) -> Result<Response, AppError> {
    let Some(path) = uploads::resolve(&state.config().upload_dir, filename) else {
        return Ok(video_not_found());
    };

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(video_not_found()),
        Err(err) => {
            return Err(AppError::Internal(format!(
                "Failed to read {}: {}",
                path.display(),
                err
            )))
        }
    };

    tracing::info!("Serving {} ({} bytes)", path.display(), bytes.len());

    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"))],
        bytes,
    )
        .into_response();

    if as_attachment {
        let stored_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("video.mp4");
        if let Ok(value) =
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", stored_name))
        {
            response
                .headers_mut()
                .insert(header::CONTENT_DISPOSITION, value);
        }
    }

    Ok(response)
}

fn video_not_found() -> Response {
    (StatusCode::NOT_FOUND, "Video not found").into_response()
}
