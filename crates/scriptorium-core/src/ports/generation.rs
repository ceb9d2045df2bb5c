//! External generation service ports - image synthesis and caption writing.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;

use super::ApiKey;

/// Output image dimensions accepted by the image service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    #[default]
    Square,
    Portrait,
    Landscape,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square => "1024x1024",
            ImageSize::Portrait => "1024x1792",
            ImageSize::Landscape => "1792x1024",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts either the orientation name or the `WxH` form.
impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" | "1024x1024" => Ok(ImageSize::Square),
            "portrait" | "1024x1792" => Ok(ImageSize::Portrait),
            "landscape" | "1792x1024" => Ok(ImageSize::Landscape),
            other => Err(format!("unsupported image size `{other}`")),
        }
    }
}

/// What the image service is asked to draw.
#[derive(Debug, Clone)]
pub struct ImageRequest<'a> {
    pub prompt: &'a str,
    /// Quote text the image illustrates.
    pub quote: &'a str,
    pub size: ImageSize,
}

/// Context handed to the caption writer.
#[derive(Debug, Clone)]
pub struct CaptionRequest<'a> {
    pub quote: &'a str,
    pub theme: &'a str,
    pub tone: &'a str,
}

/// Image synthesis service.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image and return its encoded bytes.
    async fn generate_image(
        &self,
        api_key: &ApiKey,
        request: &ImageRequest<'_>,
    ) -> Result<Vec<u8>, GenerationError>;
}

/// Caption writing service.
#[async_trait]
pub trait CaptionGenerator: Send + Sync {
    async fn generate_caption(
        &self,
        api_key: &ApiKey,
        request: &CaptionRequest<'_>,
    ) -> Result<String, GenerationError>;
}

/// Failures reported by an external generation service.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}
