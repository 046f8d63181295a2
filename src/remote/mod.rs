//! Clients for the hosted text/image-to-video services.

pub mod poll;
pub mod replicate;
pub mod sora;

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::Config;
use crate::error::RemoteError;
use poll::PollPolicy;

pub const MIN_SECONDS: u32 = 4;
pub const MAX_SECONDS: u32 = 20;
pub const DEFAULT_SECONDS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Sora,
    Replicate,
}

impl Provider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sora" | "openai" => Some(Provider::Sora),
            "replicate" => Some(Provider::Replicate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Sora => "sora",
            Provider::Replicate => "replicate",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Sora => "Sora",
            Provider::Replicate => "Replicate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSize {
    pub width: u32,
    pub height: u32,
}

impl VideoSize {
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.trim().split_once(['x', 'X'])?;
        let width: u32 = w.trim().parse().ok()?;
        let height: u32 = h.trim().parse().ok()?;
        (width > 0 && height > 0).then_some(Self { width, height })
    }
}

impl Default for VideoSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl fmt::Display for VideoSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single remote generation. `api_key` is the caller's own key (from the
/// session); the configured key is used when it is absent.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub seconds: u32,
    pub size: VideoSize,
    pub reference_image: Option<PathBuf>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub video_id: String,
    pub video_path: PathBuf,
}

pub fn clamp_seconds(seconds: i64) -> u32 {
    seconds.clamp(MIN_SECONDS as i64, MAX_SECONDS as i64) as u32
}

pub async fn generate(
    provider: Provider,
    request: &GenerationRequest,
    output_path: &Path,
    config: &Config,
    http: &reqwest::Client,
) -> Result<GenerationOutcome, RemoteError> {
    let policy = PollPolicy {
        interval: config.poll_interval,
        timeout: config.poll_timeout,
    };

    tracing::info!(
        "Generating video with {} ({}s, {}, reference image: {})",
        provider.display_name(),
        request.seconds,
        request.size,
        request.reference_image.is_some()
    );

    match provider {
        Provider::Sora => {
            let api_key = resolve_api_key(request.api_key.as_deref(), config.openai_api_key.as_deref())
                .ok_or_else(|| {
                    RemoteError::MissingApiKey(
                        "OPENAI_API_KEY not found. Please add your OpenAI API key in Settings."
                            .to_string(),
                    )
                })?;
            sora::SoraClient::new(http.clone(), &config.openai_base_url, api_key, policy)
                .generate(request, output_path)
                .await
        }
        Provider::Replicate => {
            let api_key = resolve_api_key(
                request.api_key.as_deref(),
                config.replicate_api_key.as_deref(),
            )
            .ok_or_else(|| {
                RemoteError::MissingApiKey(
                    "REPLICATE_API_KEY not found. Please add your Replicate API key in Settings."
                        .to_string(),
                )
            })?;
            replicate::ReplicateClient::new(http.clone(), &config.replicate_base_url, api_key, policy)
                .generate(request, output_path)
                .await
        }
    }
}

fn resolve_api_key(session_key: Option<&str>, configured: Option<&str>) -> Option<String> {
    session_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .or_else(|| configured.map(str::trim).filter(|key| !key.is_empty()))
        .map(str::to_string)
}

/// Flattens a provider error body into one line that keeps codes such as
/// `insufficient_quota` visible to the message mapping.
pub(crate) fn describe_error_body(status: reqwest::StatusCode, body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return format!("{}: {}", status, body.trim());
    };
    let error = value.get("error").unwrap_or(&value);
    let parts: Vec<String> = ["message", "detail", "title", "code", "type"]
        .iter()
        .filter_map(|key| error.get(*key))
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect();
    if parts.is_empty() {
        format!("{}: {}", status, body.trim())
    } else {
        format!("{}: {}", status, parts.join(" | "))
    }
}

pub(crate) fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_parse() {
        assert_eq!(Provider::from_str("sora"), Some(Provider::Sora));
        assert_eq!(Provider::from_str(" Replicate "), Some(Provider::Replicate));
        assert_eq!(Provider::from_str("runway"), None);
    }

    #[test]
    fn sizes_parse_and_print() {
        let size = VideoSize::parse("720x1280").expect("size");
        assert_eq!((size.width, size.height), (720, 1280));
        assert_eq!(size.to_string(), "720x1280");
        assert!(VideoSize::parse("1280").is_none());
        assert!(VideoSize::parse("0x720").is_none());
        assert!(VideoSize::parse("widexhigh").is_none());
    }

    #[test]
    fn seconds_are_clamped() {
        assert_eq!(clamp_seconds(1), 4);
        assert_eq!(clamp_seconds(8), 8);
        assert_eq!(clamp_seconds(60), 20);
        assert_eq!(clamp_seconds(-5), 4);
    }

    #[test]
    fn session_key_wins_over_configured_key() {
        assert_eq!(resolve_api_key(Some("sk-user"), Some("sk-env")).as_deref(), Some("sk-user"));
        assert_eq!(resolve_api_key(Some("  "), Some("sk-env")).as_deref(), Some("sk-env"));
        assert_eq!(resolve_api_key(None, None), None);
    }

    #[test]
    fn error_bodies_keep_codes() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        let described = describe_error_body(reqwest::StatusCode::TOO_MANY_REQUESTS, body);
        assert!(described.contains("insufficient_quota"));
        assert!(described.starts_with("429"));

        let plain = describe_error_body(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(plain, "502 Bad Gateway: upstream down");
    }

    #[tokio::test]
    async fn missing_keys_fail_before_any_request() {
        let config = Config::default();
        let request = GenerationRequest {
            prompt: "A sunrise over the sea".to_string(),
            seconds: 8,
            size: VideoSize::default(),
            reference_image: None,
            api_key: None,
        };
        let http = reqwest::Client::new();
        let out = std::env::temp_dir().join("never-written.mp4");

        let err = generate(Provider::Sora, &request, &out, &config, &http)
            .await
            .expect_err("no key");
        assert!(err.to_string().starts_with("OPENAI_API_KEY not found"));

        let err = generate(Provider::Replicate, &request, &out, &config, &http)
            .await
            .expect_err("no key");
        assert!(err.to_string().starts_with("REPLICATE_API_KEY not found"));
    }
}
