//! OpenAI-compatible adapters for image synthesis and caption writing.

mod caption;
mod image;

use std::time::Duration;

use scriptorium_core::ports::GenerationError;

pub use caption::OpenAiCaptionGenerator;
pub use image::OpenAiImageGenerator;

/// Shared configuration of the OpenAI adapters.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API base, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub image_model: String,
    pub text_model: String,
    /// Upper bound for one request, image generation included.
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            image_model: "dall-e-3".to_string(),
            text_model: "gpt-4".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl OpenAiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            image_model: std::env::var("OPENAI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            text_model: std::env::var("OPENAI_TEXT_MODEL").unwrap_or(defaults.text_model),
            timeout: std::env::var("GENERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn http_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
                reqwest::Client::new()
            })
    }
}

/// Longest slice of a non-JSON error body kept in an upstream error.
const MAX_ERROR_BODY: usize = 200;

/// Send a JSON request and decode the JSON reply, mapping failures to `GenerationError`.
async fn post_json(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    timeout: Duration,
    body: &serde_json::Value,
) -> Result<serde_json::Value, GenerationError> {
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| map_transport_error(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;
        return Err(GenerationError::Upstream {
            status: status.as_u16(),
            message: error_message(&text),
        });
    }

    response
        .json()
        .await
        .map_err(|e| map_transport_error(e, timeout))
}

/// `error.message` of an OpenAI error body, or the raw body cut to a readable length.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string));
    if let Some(message) = parsed {
        return message;
    }

    let raw = body.trim();
    if raw.is_empty() {
        return "empty response body".to_string();
    }
    match raw.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &raw[..cut]),
        None => raw.to_string(),
    }
}

fn map_transport_error(e: reqwest::Error, timeout: Duration) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout(timeout)
    } else if e.is_decode() {
        GenerationError::InvalidResponse(e.to_string())
    } else {
        GenerationError::Transport(e.to_string())
    }
}
