use axum::body::Bytes;
use axum::extract::Multipart;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;
use crate::remote::{self, GenerationRequest, Provider, VideoSize};
use crate::state::AppState;
use crate::uploads::{self, UploadKind};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate_sora_video", post(generate_remote_video))
        .route("/upload_image", post(upload_image))
}

#[derive(Deserialize)]
struct RemoteVideoRequest {
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    use_image: bool,
    #[serde(default)]
    image_filename: Option<String>,
    #[serde(default)]
    api_provider: Option<String>,
}

#[derive(Serialize)]
struct RemoteVideoResponse {
    success: bool,
    video_url: String,
    video_id: String,
    message: String,
}

#[derive(Serialize)]
struct UploadImageResponse {
    success: bool,
    filename: String,
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_lowercase().starts_with("application/json"))
        .unwrap_or(false)
}

fn parse_duration(value: Option<&Value>) -> Result<u32, AppError> {
    let invalid = || AppError::BadRequest("Invalid duration value".to_string());
    let seconds = match value {
        None | Some(Value::Null) => return Ok(remote::DEFAULT_SECONDS),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(invalid)?,
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };
    Ok(remote::clamp_seconds(seconds))
}

async fn generate_remote_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if !is_json(&headers) {
        return Err(AppError::BadRequest("Request must be JSON".to_string()));
    }
    let req: RemoteVideoRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid JSON request body".to_string()))?;

    let prompt = req.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(AppError::BadRequest("Prompt is required".to_string()));
    }
    let seconds = parse_duration(req.duration.as_ref())?;

    let size = match req.size.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => VideoSize::parse(raw).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid size: {}. Use WIDTHxHEIGHT, e.g. 1280x720", raw))
        })?,
        None => VideoSize::default(),
    };

    let provider_name = req.api_provider.as_deref().unwrap_or("sora");
    let provider = Provider::from_str(provider_name).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unknown api_provider: {}. Use 'sora' or 'replicate'",
            provider_name
        ))
    })?;

    let upload_dir = &state.config().upload_dir;
    let reference_image = if req.use_image {
        let requested = req.image_filename.as_deref().unwrap_or("");
        let path = uploads::resolve(upload_dir, requested)
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| uploads::is_allowed(name, UploadKind::Image))
                    .unwrap_or(false)
            })
            .ok_or_else(|| {
                AppError::BadRequest("A valid image_filename is required when use_image is set".to_string())
            })?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AppError::NotFound("Reference image not found".to_string()));
        }
        Some(path)
    } else {
        None
    };

    let session = state.sessions().resolve(&headers);
    let session_data = state.sessions().get(&session.id).unwrap_or_default();
    let api_key = match provider {
        Provider::Sora => session_data.openai_api_key,
        Provider::Replicate => session_data.replicate_api_key,
    };

    tracing::info!(
        "Remote generation via {}: {}s, {}, session key present: {}",
        provider.as_str(),
        seconds,
        size,
        api_key.is_some()
    );
    tracing::debug!("Prompt: {}", prompt);

    let request = GenerationRequest {
        prompt,
        seconds,
        size,
        reference_image,
        api_key,
    };

    let video_filename = format!("{}_{}.mp4", provider.as_str(), Uuid::new_v4());
    let output_path = upload_dir.join(&video_filename);

    let result = remote::generate(provider, &request, &output_path, state.config(), state.http()).await;
    if let Some(reference) = request.reference_image.as_ref() {
        uploads::remove_quietly(std::slice::from_ref(reference)).await;
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            uploads::remove_quietly(&[output_path]).await;
            tracing::error!("Video generation failed: {}", err);
            return Err(err.into());
        }
    };

    let last_video = video_filename.clone();
    state
        .sessions()
        .update(&session.id, |data| data.last_video = Some(last_video));

    Ok((
        session.response_headers(state.sessions().ttl()),
        Json(RemoteVideoResponse {
            success: true,
            video_url: format!("/download_video/{}", video_filename),
            video_id: outcome.video_id,
            message: format!("{} video generated successfully!", provider.display_name()),
        }),
    ))
}

async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or("").to_string();
            let bytes = field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read file bytes: {}", e))
            })?;
            upload = Some((filename, bytes.to_vec()));
        }
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("No image provided".to_string()))?;
    let path = uploads::store(&state.config().upload_dir, &filename, &bytes, UploadKind::Image).await?;
    let stored = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(Json(UploadImageResponse {
        success: true,
        filename: stored,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn durations_default_parse_and_clamp() {
        assert_eq!(parse_duration(None).ok(), Some(8));
        assert_eq!(parse_duration(Some(&json!(12))).ok(), Some(12));
        assert_eq!(parse_duration(Some(&json!("30"))).ok(), Some(20));
        assert_eq!(parse_duration(Some(&json!(2.9))).ok(), Some(4));
        assert!(parse_duration(Some(&json!("eight"))).is_err());
        assert!(parse_duration(Some(&json!([8]))).is_err());
    }
}
