//! Caption writing through the `chat/completions` endpoint.

use async_trait::async_trait;

use scriptorium_core::ports::{ApiKey, CaptionGenerator, CaptionRequest, GenerationError};

use super::{OpenAiConfig, post_json};

const SYSTEM_PROMPT: &str = "You are the archivist of the Order of the Ember, a secret society of \
readers who keep the fragments of 'We Burned, Quietly'. You write in a dark academia register: \
literary, restrained, melancholic, never cheerful marketing copy.";

pub struct OpenAiCaptionGenerator {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiCaptionGenerator {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: config.http_client(),
            config,
        }
    }
}

fn user_prompt(request: &CaptionRequest<'_>) -> String {
    format!(
        "Write an Instagram caption for this quote: \"{}\"\n\
         Theme: {}\nTone: {}\n\n\
         Write 2-4 sentences that deepen the quote without repeating it, \
         and end with a reflective question for the reader. \
         Do not include hashtags, emojis or a call to action.",
        request.quote, request.theme, request.tone
    )
}

/// Drop hashtag lines the model adds despite instructions; hashtags are appended later.
fn clean_caption(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[async_trait]
impl CaptionGenerator for OpenAiCaptionGenerator {
    async fn generate_caption(
        &self,
        api_key: &ApiKey,
        request: &CaptionRequest<'_>,
    ) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "model": self.config.text_model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt(request) },
            ],
            "max_tokens": 300,
            "temperature": 0.8,
        });

        let payload = post_json(
            &self.client,
            &self.config.endpoint("chat/completions"),
            api_key.expose(),
            self.config.timeout,
            &body,
        )
        .await?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                GenerationError::InvalidResponse("missing choices[0].message.content".to_string())
            })?;

        let caption = clean_caption(content);
        if caption.is_empty() {
            return Err(GenerationError::InvalidResponse("empty caption".to_string()));
        }
        Ok(caption)
    }
}
