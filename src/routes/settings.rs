use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/save_settings", post(save_settings))
        .route("/get_settings", get(get_settings))
}

#[derive(Deserialize, Default)]
struct SettingsRequest {
    #[serde(default)]
    openai_api_key: Option<String>,
    #[serde(default)]
    replicate_api_key: Option<String>,
}

#[derive(Serialize)]
struct SettingsResponse {
    openai_api_key: String,
    replicate_api_key: String,
}

#[derive(Serialize)]
struct SaveResponse {
    success: bool,
}

/// Empty or missing values clear the stored key.
fn normalize_key(value: Option<String>) -> Option<String> {
    value
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

async fn save_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: SettingsRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid request".to_string()))?;

    let openai_api_key = normalize_key(payload.openai_api_key);
    let replicate_api_key = normalize_key(payload.replicate_api_key);

    let session = state.sessions().resolve(&headers);
    tracing::info!(
        "Saving settings for session (openai key: {}, replicate key: {})",
        openai_api_key.is_some(),
        replicate_api_key.is_some()
    );
    state.sessions().update(&session.id, |data| {
        data.openai_api_key = openai_api_key;
        data.replicate_api_key = replicate_api_key;
    });

    Ok((
        session.response_headers(state.sessions().ttl()),
        Json(SaveResponse { success: true }),
    ))
}

async fn get_settings(State(state): State<AppState>, headers: HeaderMap) -> Json<SettingsResponse> {
    let data = state.sessions().for_request(&headers);
    Json(SettingsResponse {
        openai_api_key: data.openai_api_key.unwrap_or_default(),
        replicate_api_key: data.replicate_api_key.unwrap_or_default(),
    })
}
