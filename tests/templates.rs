use axum::{body::to_bytes, http::Request, Router};
use reelsmith::{config::Config, routes, state::AppState};
use serde_json::Value;
use tower::ServiceExt;

fn app() -> Router {
    let state = AppState::new(Config::default());
    Router::new()
        .merge(routes::templates::router())
        .with_state(state)
}

async fn get(uri: &str) -> (axum::http::StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method("GET")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&body).expect("json"))
}

#[tokio::test]
async fn lists_catalog_and_prompts() {
    let (status, json) = get("/api/templates").await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let templates = json["templates"].as_array().expect("templates array");
    assert_eq!(templates.len(), 10);
    assert_eq!(templates[0]["id"], 1);
    assert!(templates[0]["text_slots"].is_array());

    let prompts = json["prompts"].as_array().expect("prompts array");
    assert_eq!(prompts.len(), 50);
}

#[tokio::test]
async fn returns_single_template() {
    let (status, json) = get("/get_template/3").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["id"], 3);
    assert!(json["image_slots"].as_u64().is_some());
    assert_eq!(json["bg_color"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    for uri in ["/get_template/999", "/get_template/abc"] {
        let (status, json) = get(uri).await;
        assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Template not found");
    }
}
