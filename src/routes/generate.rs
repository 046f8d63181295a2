use std::collections::HashMap;
use std::path::PathBuf;

use axum::extract::Multipart;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog;
use crate::error::{AppError, UploadError};
use crate::pipeline::{self, layout, CompositionJob};
use crate::state::AppState;
use crate::uploads::{self, UploadKind};

pub fn router() -> Router<AppState> {
    Router::new().route("/generate_video", post(generate_video))
}

#[derive(Serialize)]
struct GenerateResponse {
    success: bool,
    video_url: String,
    preview_url: String,
    message: String,
    generated_at: String,
}

struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct GenerateForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl GenerateForm {
    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

async fn read_form(mut multipart: Multipart) -> Result<GenerateForm, AppError> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        match field.file_name().map(|s| s.to_string()) {
            Some(filename) => {
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file bytes: {}", e))
                })?;
                form.files.insert(
                    name,
                    UploadedFile {
                        filename,
                        bytes: bytes.to_vec(),
                    },
                );
            }
            None => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read form field: {}", e))
                })?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Stores one optional upload, skipping empty or disallowed files the way a
/// browser form with an unused picker would send them.
async fn store_optional(
    state: &AppState,
    file: Option<&UploadedFile>,
    kind: UploadKind,
) -> Result<Option<PathBuf>, AppError> {
    let Some(file) = file.filter(|file| !file.filename.is_empty() && !file.bytes.is_empty()) else {
        return Ok(None);
    };
    match uploads::store(&state.config().upload_dir, &file.filename, &file.bytes, kind).await {
        Ok(path) => Ok(Some(path)),
        Err(err @ UploadError::Io(_)) => Err(err.into()),
        Err(err) => {
            tracing::warn!("Ignoring upload: {}", err);
            Ok(None)
        }
    }
}

/// Stores the slot images and soundtrack. If any write fails, files already
/// stored for this request are removed before the error is returned.
async fn store_inputs(
    state: &AppState,
    form: &GenerateForm,
    image_slots: usize,
) -> Result<(Vec<PathBuf>, Option<PathBuf>), AppError> {
    let mut images = Vec::new();
    for slot in 0..image_slots {
        let file = form.files.get(&format!("image_{}", slot));
        match store_optional(state, file, UploadKind::Image).await {
            Ok(Some(path)) => images.push(path),
            Ok(None) => {}
            Err(err) => {
                uploads::remove_quietly(&images).await;
                return Err(err);
            }
        }
    }

    match store_optional(state, form.files.get("background_music"), UploadKind::Audio).await {
        Ok(audio) => Ok((images, audio)),
        Err(err) => {
            uploads::remove_quietly(&images).await;
            Err(err)
        }
    }
}

async fn generate_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_form(multipart).await?;

    let template_id = form
        .text("template_id")
        .ok_or_else(|| AppError::BadRequest("Template ID is required".to_string()))?;
    let template_id: u32 = template_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid template ID: {}", template_id)))?;
    let template = catalog::find(template_id)
        .ok_or_else(|| AppError::BadRequest("Invalid template selected".to_string()))?;

    let background = match form.text("background_color") {
        Some(color) => layout::parse_hex_color(color).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid background color: {}. Use a hex value like #1e3c72",
                color
            ))
        })?,
        None => template.bg_color,
    };

    let (images, audio) = store_inputs(&state, &form, template.image_slots).await?;

    let custom_text = form.text("custom_text").unwrap_or("");
    if let Some(prompt) = form.text("text_prompt") {
        tracing::debug!("Selected prompt: {}", prompt);
    }
    let text_overlays = layout::resolve_text_overlays(template, custom_text);

    let video_filename = format!("video_{}.mp4", Uuid::new_v4());
    let job = CompositionJob {
        template: template.clone(),
        images: images.clone(),
        text_overlays,
        audio: audio.clone(),
        background,
        output_path: state.config().upload_dir.join(&video_filename),
        settings: state.render_settings(),
    };

    tracing::info!(
        "Generating template {} with {} image(s), audio: {}",
        template.id,
        images.len(),
        audio.is_some()
    );

    let result = tokio::task::spawn_blocking(move || pipeline::compose(&job)).await;

    let mut inputs = images;
    inputs.extend(audio);
    uploads::remove_quietly(&inputs).await;

    result.map_err(|e| AppError::Internal(format!("Render task failed: {}", e)))??;

    let session = state.sessions().resolve(&headers);
    let last_video = video_filename.clone();
    state
        .sessions()
        .update(&session.id, |data| data.last_video = Some(last_video));

    Ok((
        session.response_headers(state.sessions().ttl()),
        Json(GenerateResponse {
            success: true,
            video_url: format!("/download_video/{}", video_filename),
            preview_url: format!("/preview_video/{}", video_filename),
            message: "Video generated successfully!".to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    async fn state_in_temp_dir() -> AppState {
        let mut config = Config::default();
        config.upload_dir =
            std::env::temp_dir().join(format!("reelsmith-inputs-{}", Uuid::new_v4()));
        let state = AppState::new(config);
        state.prepare_storage().await.expect("upload dir");
        state
    }

    fn form_with(files: &[(&str, &str, &[u8])]) -> GenerateForm {
        let mut form = GenerateForm::default();
        for (field, filename, bytes) in files {
            form.files.insert(
                field.to_string(),
                UploadedFile {
                    filename: filename.to_string(),
                    bytes: bytes.to_vec(),
                },
            );
        }
        form
    }

    #[tokio::test]
    async fn allowed_soundtrack_is_stored() {
        let state = state_in_temp_dir().await;
        let form = form_with(&[
            ("image_0", "a.png", &b"png"[..]),
            ("background_music", "song.mp3", &b"id3"[..]),
        ]);

        let (images, audio) = store_inputs(&state, &form, 2).await.expect("stored");
        assert_eq!(images.len(), 1);
        let audio = audio.expect("soundtrack kept");
        assert!(audio.to_string_lossy().ends_with("song.mp3"));
        assert_eq!(std::fs::read(&audio).expect("audio file"), &b"id3"[..]);
        let _ = std::fs::remove_dir_all(&state.config().upload_dir);
    }

    #[tokio::test]
    async fn disallowed_soundtrack_and_extra_slots_are_skipped() {
        let state = state_in_temp_dir().await;
        let form = form_with(&[
            ("image_0", "a.png", &b"png"[..]),
            ("image_1", "b.png", &b"png"[..]),
            ("background_music", "notes.txt", &b"text"[..]),
        ]);

        let (images, audio) = store_inputs(&state, &form, 1).await.expect("stored");
        assert_eq!(images.len(), 1);
        assert!(audio.is_none());
        let stored = std::fs::read_dir(&state.config().upload_dir)
            .expect("read dir")
            .count();
        assert_eq!(stored, 1);
        let _ = std::fs::remove_dir_all(&state.config().upload_dir);
    }

    #[tokio::test]
    async fn failed_write_removes_earlier_inputs() {
        let state = state_in_temp_dir().await;
        let dir = state.config().upload_dir.clone();
        // Passes the extension check but exceeds the file name limit on write.
        let long_name = format!("{}.png", "a".repeat(300));
        let form = form_with(&[
            ("image_0", "a.png", &b"png"[..]),
            ("image_1", long_name.as_str(), &b"png"[..]),
        ]);

        let result = store_inputs(&state, &form, 2).await;
        assert!(matches!(result, Err(AppError::Upload(UploadError::Io(_)))));
        let left = std::fs::read_dir(&dir).expect("read dir").count();
        assert_eq!(left, 0);
        let _ = std::fs::remove_dir_all(dir);
    }
}
