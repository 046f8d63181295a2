use axum::{
    body::to_bytes,
    http::{header, Request, StatusCode},
    Router,
};
use reelsmith::{config::Config, routes, state::AppState};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "X-BOUNDARY-TEST";

async fn app_in(dir: &std::path::Path) -> Router {
    let mut config = Config::default();
    config.upload_dir = dir.to_path_buf();
    let state = AppState::new(config);
    state.prepare_storage().await.expect("upload dir");
    Router::new()
        .merge(routes::media::router())
        .merge(routes::remote::router())
        .with_state(state)
}

fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("reelsmith-media-{}", uuid::Uuid::new_v4()))
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(axum::body::Body::empty())
        .expect("request")
}

fn image_upload(file_name: &str, body: &str) -> Request<axum::body::Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{body}\r\n--{BOUNDARY}--\r\n"
    );
    Request::builder()
        .uri("/upload_image")
        .method("POST")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(axum::body::Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn missing_video_is_not_found() {
    let dir = temp_dir();
    let app = app_in(&dir).await;

    for uri in ["/download_video/nope.mp4", "/preview_video/nope.mp4"] {
        let response = app.clone().oneshot(get(uri)).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(&body[..], b"Video not found");
    }
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn download_is_an_attachment_and_preview_is_inline() {
    let dir = temp_dir();
    let app = app_in(&dir).await;
    std::fs::write(dir.join("video_abc.mp4"), b"mp4-bytes").expect("write video");

    let download = app
        .clone()
        .oneshot(get("/download_video/video_abc.mp4"))
        .await
        .expect("response");
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(download.headers()[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(
        download.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"video_abc.mp4\""
    );
    let body = to_bytes(download.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert_eq!(&body[..], b"mp4-bytes");

    let preview = app
        .oneshot(get("/preview_video/video_abc.mp4"))
        .await
        .expect("response");
    assert_eq!(preview.status(), StatusCode::OK);
    assert_eq!(preview.headers()[header::CONTENT_TYPE], "video/mp4");
    assert!(preview.headers().get(header::CONTENT_DISPOSITION).is_none());
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn path_traversal_stays_inside_upload_dir() {
    let dir = temp_dir();
    let app = app_in(&dir).await;

    let response = app
        .oneshot(get("/download_video/..%2F..%2Fetc%2Fpasswd"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn upload_image_stores_allowed_file() {
    let dir = temp_dir();
    let app = app_in(&dir).await;

    let response = app
        .oneshot(image_upload("My Photo.png", "png-bytes"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(json["success"], true);

    let stored = json["filename"].as_str().expect("filename");
    assert!(stored.ends_with("My_Photo.png"), "{stored}");
    assert_eq!(
        std::fs::read(dir.join(stored)).expect("stored file"),
        b"png-bytes"
    );
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn upload_image_rejects_other_types() {
    let dir = temp_dir();
    let app = app_in(&dir).await;

    let response = app
        .oneshot(image_upload("script.sh", "echo hi"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json");
    assert!(json["error"].as_str().unwrap_or("").contains("Unsupported image file"));
    let _ = std::fs::remove_dir_all(dir);
}
