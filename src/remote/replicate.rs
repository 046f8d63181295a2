use std::path::Path;

use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::RemoteError;
use crate::remote::poll::{self, PollPolicy, PollableJob};
use crate::remote::{describe_error_body, guess_mime, GenerationOutcome, GenerationRequest};

/// Stable Video Diffusion model version.
const MODEL_VERSION: &str = "3f0457e4619daac51203dedb472816fd4af51f3149fa7a9e0b5ffcf1b8172438";
const FPS: u32 = 24;
const MAX_FRAMES: u32 = 96;

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl PollableJob for Prediction {
    fn is_pending(&self) -> bool {
        matches!(self.status.as_str(), "starting" | "processing")
    }

    fn status(&self) -> &str {
        &self.status
    }
}

impl Prediction {
    /// The model returns either one URL or a list of them.
    pub fn output_url(&self) -> Option<&str> {
        match self.output.as_ref()? {
            Value::String(url) => Some(url.as_str()),
            Value::Array(items) => items.iter().find_map(Value::as_str),
            _ => None,
        }
    }

    fn failure_reason(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => format!("prediction {}", self.status),
            Some(other) => other.to_string(),
        }
    }
}

pub fn friendly_error(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("invalid_api_key")
        || lower.contains("authentication")
        || lower.contains("unauthenticated")
        || lower.contains("unauthorized")
    {
        "Invalid Replicate API key. Get one free at replicate.com".to_string()
    } else if lower.contains("rate_limit") || lower.contains("throttled") || lower.contains("too many requests") {
        "Rate limit exceeded. Please wait and try again.".to_string()
    } else if lower.contains("insufficient") || lower.contains("payment required") {
        "Insufficient credits. Visit replicate.com to add credits.".to_string()
    } else {
        format!("Replicate API error: {}", raw)
    }
}

fn api_error(raw: String) -> RemoteError {
    tracing::error!("Replicate request failed: {}", raw);
    RemoteError::Api {
        friendly: friendly_error(&raw),
        raw,
    }
}

/// Frames requested from the model: capped at four seconds of footage.
pub fn video_length(seconds: u32) -> u32 {
    (seconds * FPS).min(MAX_FRAMES)
}

pub struct ReplicateClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    policy: PollPolicy,
}

impl ReplicateClient {
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
        let input = self.build_input(request).await?;
        let prediction = self.create(input).await?;
        tracing::info!(
            "Replicate prediction {} created with status {}",
            prediction.id,
            prediction.status
        );

        let id = prediction.id.clone();
        let prediction = poll::wait_for_job(prediction, self.policy, || self.retrieve(&id)).await?;

        if prediction.status != "succeeded" {
            return Err(RemoteError::JobFailed(prediction.failure_reason()));
        }
        let url = prediction
            .output_url()
            .ok_or(RemoteError::EmptyOutput("Replicate"))?;

        self.download(url, output_path).await?;
        tracing::info!(
            "Replicate prediction {} saved to {}",
            prediction.id,
            output_path.display()
        );

        Ok(GenerationOutcome {
            video_id: prediction.id,
            video_path: output_path.to_path_buf(),
        })
    }

    async fn build_input(&self, request: &GenerationRequest) -> Result<Value, RemoteError> {
        let mut input = json!({
            "prompt": request.prompt,
            "fps": FPS,
            "motion_bucket_id": 127,
            "cond_aug": 0.02,
            "decoding_t": 14,
            "video_length": video_length(request.seconds),
        });

        if let Some(image_path) = request.reference_image.as_ref() {
            let bytes = tokio::fs::read(image_path).await?;
            input["input_image"] = Value::String(data_uri(&bytes, guess_mime(image_path)));
        }

        Ok(input)
    }

    async fn create(&self, input: Value) -> Result<Prediction, RemoteError> {
        let response = self
            .http
            .post(format!("{}/predictions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "version": MODEL_VERSION,
                "input": input,
            }))
            .send()
            .await
            .map_err(|e| api_error(e.to_string()))?;

        parse_json(response).await
    }

    async fn retrieve(&self, id: &str) -> Result<Prediction, RemoteError> {
        let response = self
            .http
            .get(format!("{}/predictions/{}", self.base_url, id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| api_error(e.to_string()))?;

        parse_json(response).await
    }

    async fn download(&self, url: &str, output_path: &Path) -> Result<(), RemoteError> {
        // Delivery URLs are pre-signed; no credentials are sent to them.
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| api_error(format!("Download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(api_error(format!(
                "Download failed with status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| api_error(format!("Failed to read download: {}", e)))?;
        tokio::fs::write(output_path, &bytes).await?;
        Ok(())
    }
}

fn data_uri(bytes: &[u8], mime: &str) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

async fn parse_json(response: reqwest::Response) -> Result<Prediction, RemoteError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(api_error(describe_error_body(status, &body)));
    }
    response
        .json::<Prediction>()
        .await
        .map_err(|e| api_error(format!("Invalid response: {}", e)))
}
