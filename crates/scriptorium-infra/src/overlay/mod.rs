//! Quote overlay drawn onto generated images.
//!
//! [`QuoteOverlayImageGenerator`] wraps another [`ImageGenerator`] and prints
//! the quote with the Order's attribution over a translucent band in the bottom
//! third of the picture.

mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::FontVec;
use async_trait::async_trait;

use scriptorium_core::ports::{ApiKey, GenerationError, ImageGenerator, ImageRequest};

/// Fonts tried when `OVERLAY_FONT_PATH` is unset or unreadable.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/TTF/DejaVuSerif.ttf",
    "/usr/share/fonts/dejavu/DejaVuSerif.ttf",
];

/// Overlay configuration.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Draw the overlay at all (`IMAGE_OVERLAY`).
    pub enabled: bool,
    /// TrueType/OpenType font tried before the system fonts.
    pub font_path: Option<PathBuf>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_path: None,
        }
    }
}

impl OverlayConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("IMAGE_OVERLAY")
                .map(|v| flag_enabled(&v))
                .unwrap_or(true),
            font_path: std::env::var("OVERLAY_FONT_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// First loadable font: the configured one, then the system candidates.
    pub fn load_font(&self) -> Option<FontVec> {
        if let Some(path) = &self.font_path {
            match read_font(path) {
                Ok(font) => return Some(font),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot use configured overlay font")
                }
            }
        }

        SYSTEM_FONTS
            .iter()
            .map(Path::new)
            .find_map(|path| read_font(path).ok())
    }
}

fn flag_enabled(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

fn read_font(path: &Path) -> Result<FontVec, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let font = FontVec::try_from_vec(bytes).map_err(|e| e.to_string())?;
    tracing::debug!(path = %path.display(), "Overlay font loaded");
    Ok(font)
}

/// Image generator decorator that prints the quote onto every image.
///
/// Without a font the inner generator's bytes are returned untouched.
pub struct QuoteOverlayImageGenerator<G> {
    inner: G,
    font: Option<Arc<FontVec>>,
}

impl<G: ImageGenerator> QuoteOverlayImageGenerator<G> {
    pub fn new(inner: G, config: &OverlayConfig) -> Self {
        let font = config.load_font();
        if font.is_none() {
            tracing::warn!("No overlay font available, images will be stored without the quote");
        }
        Self::with_font(inner, font)
    }

    pub fn with_font(inner: G, font: Option<FontVec>) -> Self {
        Self {
            inner,
            font: font.map(Arc::new),
        }
    }
}

#[async_trait]
impl<G: ImageGenerator> ImageGenerator for QuoteOverlayImageGenerator<G> {
    async fn generate_image(
        &self,
        api_key: &ApiKey,
        request: &ImageRequest<'_>,
    ) -> Result<Vec<u8>, GenerationError> {
        let image = self.inner.generate_image(api_key, request).await?;
        let Some(font) = self.font.clone() else {
            return Ok(image);
        };

        let quote = request.quote.to_string();
        let started = std::time::Instant::now();
        let rendered = tokio::task::spawn_blocking(move || render::render(&image, &quote, &font))
            .await
            .map_err(|e| GenerationError::InvalidResponse(format!("overlay task failed: {e}")))?
            .map_err(|e| GenerationError::InvalidResponse(format!("cannot draw overlay: {e}")))?;

        tracing::debug!(
            bytes = rendered.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Quote overlay drawn"
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};
    use scriptorium_core::ports::ImageSize;

    use super::*;

    struct BlankCanvas {
        bytes: Vec<u8>,
    }

    #[async_trait]
    impl ImageGenerator for BlankCanvas {
        async fn generate_image(
            &self,
            _api_key: &ApiKey,
            _request: &ImageRequest<'_>,
        ) -> Result<Vec<u8>, GenerationError> {
            Ok(self.bytes.clone())
        }
    }

    pub(super) fn white_png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    pub(super) fn system_font() -> Option<FontVec> {
        let font = OverlayConfig::default().load_font();
        if font.is_none() {
            eprintln!("no system font found, skipping overlay rendering test");
        }
        font
    }

    fn request() -> ImageRequest<'static> {
        ImageRequest {
            prompt: "a candlelit library",
            quote: "We kept the ashes warm.",
            size: ImageSize::Square,
        }
    }

    #[tokio::test]
    async fn test_without_font_image_passes_through() {
        let bytes = white_png(64, 64);
        let generator = QuoteOverlayImageGenerator::with_font(
            BlankCanvas {
                bytes: bytes.clone(),
            },
            None,
        );
        let image = generator
            .generate_image(&ApiKey::new("sk-test"), &request())
            .await
            .unwrap();
        assert_eq!(image, bytes);
    }

    #[tokio::test]
    async fn test_overlay_is_drawn_over_generated_png() {
        let Some(font) = system_font() else { return };
        let generator = QuoteOverlayImageGenerator::with_font(
            BlankCanvas {
                bytes: white_png(512, 512),
            },
            Some(font),
        );

        let image = generator
            .generate_image(&ApiKey::new("sk-test"), &request())
            .await
            .unwrap();

        let decoded = image::load_from_memory(&image).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (512, 512));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(decoded.get_pixel(256, 100), &Rgb([255, 255, 255]));
        // Bottom padding of the band, below the signature line.
        assert_eq!(decoded.get_pixel(30, 430), &Rgb([135, 135, 135]));
        assert_eq!(decoded.get_pixel(256, 500), &Rgb([255, 255, 255]));
    }

    #[tokio::test]
    async fn test_undecodable_image_is_invalid_response() {
        let Some(font) = system_font() else { return };
        let generator = QuoteOverlayImageGenerator::with_font(
            BlankCanvas {
                bytes: b"not an image".to_vec(),
            },
            Some(font),
        );

        let err = generator
            .generate_image(&ApiKey::new("sk-test"), &request())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn test_overlay_flag_values() {
        assert!(flag_enabled("true"));
        assert!(flag_enabled("1"));
        assert!(!flag_enabled("off"));
        assert!(!flag_enabled(" False "));
    }

    #[test]
    fn test_unreadable_configured_font_falls_back() {
        let config = OverlayConfig {
            enabled: true,
            font_path: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")),
        };
        let fallback = OverlayConfig::default().load_font();
        assert_eq!(config.load_font().is_some(), fallback.is_some());
    }
}
