use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use crate::error::RemoteError;
use crate::remote::poll::{self, PollPolicy, PollableJob};
use crate::remote::{describe_error_body, guess_mime, GenerationOutcome, GenerationRequest};

const MODEL: &str = "sora-2";

#[derive(Debug, Clone, Deserialize)]
pub struct SoraVideo {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl PollableJob for SoraVideo {
    fn is_pending(&self) -> bool {
        matches!(self.status.as_str(), "queued" | "in_progress")
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn progress(&self) -> Option<f64> {
        self.progress
    }
}

impl SoraVideo {
    fn failure_reason(&self) -> String {
        match &self.error {
            Some(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => format!("status '{}'", self.status),
        }
    }
}

/// Maps raw API failures onto messages a user can act on.
pub fn friendly_error(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("organization must be verified") {
        "Your OpenAI organization needs verification. Visit platform.openai.com/settings/organization/general".to_string()
    } else if lower.contains("rate_limit") {
        "Rate limit exceeded. Please wait and try again.".to_string()
    } else if lower.contains("insufficient_quota") {
        "Insufficient API credits. Please check your OpenAI account balance.".to_string()
    } else if lower.contains("invalid_api_key") || lower.contains("incorrect api key") {
        "Invalid API key. Please check your OpenAI API key in Settings.".to_string()
    } else {
        format!("Sora API error: {}", raw)
    }
}

fn api_error(raw: String) -> RemoteError {
    tracing::error!("Sora request failed: {}", raw);
    RemoteError::Api {
        friendly: friendly_error(&raw),
        raw,
    }
}

pub struct SoraClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    policy: PollPolicy,
}

impl SoraClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: String, policy: PollPolicy) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            policy,
        }
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
        output_path: &Path,
    ) -> Result<GenerationOutcome, RemoteError> {
        let video = self.create(request).await?;
        tracing::info!("Sora video {} created with status {}", video.id, video.status);

        let id = video.id.clone();
        let video = poll::wait_for_job(video, self.policy, || self.retrieve(&id)).await?;

        if video.status != "completed" {
            return Err(RemoteError::JobFailed(video.failure_reason()));
        }

        self.download(&video.id, output_path).await?;
        tracing::info!("Sora video {} saved to {}", video.id, output_path.display());

        Ok(GenerationOutcome {
            video_id: video.id,
            video_path: output_path.to_path_buf(),
        })
    }

    async fn create(&self, request: &GenerationRequest) -> Result<SoraVideo, RemoteError> {
        let mut form = Form::new()
            .text("model", MODEL)
            .text("prompt", request.prompt.clone())
            .text("size", request.size.to_string())
            .text("seconds", request.seconds.to_string());

        if let Some(image_path) = request.reference_image.as_ref() {
            let bytes = tokio::fs::read(image_path).await?;
            let file_name = image_path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("reference.png")
                .to_string();
            let part = Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(guess_mime(image_path))
                .map_err(|e| api_error(e.to_string()))?;
            form = form.part("input_reference", part);
        }

        let response = self
            .http
            .post(format!("{}/videos", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| api_error(e.to_string()))?;

        parse_json(response).await
    }

    async fn retrieve(&self, id: &str) -> Result<SoraVideo, RemoteError> {
        let response = self
            .http
            .get(format!("{}/videos/{}", self.base_url, id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| api_error(e.to_string()))?;

        parse_json(response).await
    }

    async fn download(&self, id: &str, output_path: &Path) -> Result<(), RemoteError> {
        let response = self
            .http
            .get(format!("{}/videos/{}/content", self.base_url, id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| api_error(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(describe_error_body(status, &body)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| api_error(format!("Failed to read video content: {}", e)))?;
        tokio::fs::write(output_path, &bytes).await?;
        Ok(())
    }
}

async fn parse_json(response: reqwest::Response) -> Result<SoraVideo, RemoteError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(api_error(describe_error_body(status, &body)));
    }
    response
        .json::<SoraVideo>()
        .await
        .map_err(|e| api_error(format!("Invalid response: {}", e)))
}
