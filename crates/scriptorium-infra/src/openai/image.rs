//! Image generation through the `images/generations` endpoint.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use scriptorium_core::ports::{ApiKey, GenerationError, ImageGenerator, ImageRequest};

use super::{OpenAiConfig, post_json};

pub struct OpenAiImageGenerator {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiImageGenerator {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: config.http_client(),
            config,
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate_image(
        &self,
        api_key: &ApiKey,
        request: &ImageRequest<'_>,
    ) -> Result<Vec<u8>, GenerationError> {
        let body = serde_json::json!({
            "model": self.config.image_model,
            "prompt": request.prompt,
            "size": request.size.as_str(),
            "quality": "standard",
            "n": 1,
            "response_format": "b64_json",
        });

        let started = std::time::Instant::now();
        let payload = post_json(
            &self.client,
            &self.config.endpoint("images/generations"),
            api_key.expose(),
            self.config.timeout,
            &body,
        )
        .await?;

        let encoded = payload["data"][0]["b64_json"].as_str().ok_or_else(|| {
            GenerationError::InvalidResponse("missing data[0].b64_json".to_string())
        })?;
        let image = STANDARD
            .decode(encoded)
            .map_err(|e| GenerationError::InvalidResponse(format!("invalid base64 image: {e}")))?;

        tracing::debug!(
            bytes = image.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Image generated"
        );
        Ok(image)
    }
}
