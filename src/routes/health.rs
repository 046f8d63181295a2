use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::pipeline::encode;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness plus whether local composition can currently encode.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let ffmpeg_path = state.config().ffmpeg_path.clone();
    let ffmpeg = tokio::task::spawn_blocking(move || encode::is_ffmpeg_available(&ffmpeg_path))
        .await
        .unwrap_or(false);

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "ffmpeg": ffmpeg
    }))
}
