use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::pipeline::RenderSettings;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    sessions: SessionStore,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: SessionStore::new(config.session_ttl),
            config: Arc::new(config),
            http: build_http_client(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            fps: self.config.video_fps,
            ffmpeg_path: self.config.ffmpeg_path.clone(),
            ..RenderSettings::default()
        }
    }

    /// Creates the upload directory if needed.
    pub async fn prepare_storage(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.config.upload_dir).await
    }
}

fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!("Falling back to default HTTP client: {}", err);
            reqwest::Client::new()
        })
}
