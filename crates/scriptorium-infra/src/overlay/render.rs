//! Band and text rasterisation.

use std::io::Cursor;

use ab_glyph::{Font, FontVec, PxScale, PxScaleFont, ScaleFont, point};
use image::{ImageFormat, RgbImage};

use scriptorium_core::domain::caption::ATTRIBUTION;

const BAND_ALPHA: f32 = 120.0 / 255.0;
const SHADOW_ALPHA: f32 = 100.0 / 255.0;
const SHADOW_OFFSET: f32 = 2.0;
const BAND_PADDING: f32 = 30.0;
const BOTTOM_MARGIN: f32 = 100.0;
const LINE_GAP: f32 = 10.0;
/// Share of the image width the text may span.
const TEXT_WIDTH_RATIO: f32 = 0.8;

const BLACK: [u8; 3] = [0, 0, 0];
const WHITE: [u8; 3] = [255, 255, 255];

/// Where the band and each text line go on a canvas.
#[derive(Debug, Clone)]
pub(super) struct Layout {
    pub scale: PxScale,
    pub lines: Vec<String>,
    pub line_height: f32,
    pub text_top: f32,
    pub band: Band,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Band {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

fn font_size(width: u32) -> f32 {
    (width / 20).clamp(24, 48) as f32
}

pub(super) fn layout(width: u32, height: u32, quote: &str, font: &FontVec) -> Layout {
    let scale = PxScale::from(font_size(width));
    let scaled = font.as_scaled(scale);
    let max_width = width as f32 * TEXT_WIDTH_RATIO;

    let mut lines = wrap(&format!("\"{}\"", quote.trim()), &scaled, max_width);
    lines.push(String::new());
    lines.push(ATTRIBUTION.to_string());

    let line_height = scaled.height() + LINE_GAP;
    let text_height = line_height * lines.len() as f32;
    let text_top = height as f32 - text_height - BOTTOM_MARGIN;
    let center = width as f32 / 2.0;
    let half_band = max_width / 2.0 + BAND_PADDING;

    Layout {
        scale,
        lines,
        line_height,
        text_top,
        band: Band {
            left: center - half_band,
            top: text_top - BAND_PADDING,
            right: center + half_band,
            bottom: text_top + text_height + BAND_PADDING,
        },
    }
}

/// Decode `bytes`, draw the band and the quote, and re-encode as PNG.
pub(super) fn render(bytes: &[u8], quote: &str, font: &FontVec) -> Result<Vec<u8>, image::ImageError> {
    let mut canvas = image::load_from_memory(bytes)?.to_rgb8();
    let (width, height) = canvas.dimensions();
    let layout = layout(width, height, quote, font);

    darken(&mut canvas, layout.band);

    let scaled = font.as_scaled(layout.scale);
    let center = width as f32 / 2.0;
    for (i, line) in layout.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let x = center - line_width(&scaled, line) / 2.0;
        let y = layout.text_top + i as f32 * layout.line_height;
        draw_line(&mut canvas, &scaled, line, x + SHADOW_OFFSET, y + SHADOW_OFFSET, BLACK, SHADOW_ALPHA);
        draw_line(&mut canvas, &scaled, line, x, y, WHITE, 1.0);
    }

    let mut out = Cursor::new(Vec::new());
    canvas.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Greedy word wrap; a single word wider than `max_width` gets its own line.
fn wrap(text: &str, font: &PxScaleFont<&FontVec>, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if line_width(font, &candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn line_width(font: &PxScaleFont<&FontVec>, text: &str) -> f32 {
    let mut width = 0.0;
    let mut previous = None;
    for c in text.chars() {
        let id = font.glyph_id(c);
        if let Some(prev) = previous {
            width += font.kern(prev, id);
        }
        width += font.h_advance(id);
        previous = Some(id);
    }
    width
}

fn draw_line(
    canvas: &mut RgbImage,
    font: &PxScaleFont<&FontVec>,
    text: &str,
    x: f32,
    top: f32,
    color: [u8; 3],
    alpha: f32,
) {
    let baseline = top + font.ascent();
    let mut caret = x;
    let mut previous = None;

    for c in text.chars() {
        let id = font.glyph_id(c);
        if let Some(prev) = previous {
            caret += font.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(font.scale(), point(caret, baseline));
        caret += font.h_advance(id);
        previous = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i64 + i64::from(gx);
            let py = bounds.min.y as i64 + i64::from(gy);
            blend(canvas, px, py, color, coverage * alpha);
        });
    }
}

fn darken(canvas: &mut RgbImage, band: Band) {
    let (width, height) = canvas.dimensions();
    let left = band.left.max(0.0) as u32;
    let top = band.top.max(0.0) as u32;
    let right = (band.right.max(0.0) as u32).min(width);
    let bottom = (band.bottom.max(0.0) as u32).min(height);

    for y in top..bottom {
        for x in left..right {
            blend(canvas, i64::from(x), i64::from(y), BLACK, BAND_ALPHA);
        }
    }
}

fn blend(canvas: &mut RgbImage, x: i64, y: i64, color: [u8; 3], alpha: f32) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (channel, target) in pixel.0.iter_mut().zip(color) {
        *channel = (f32::from(*channel) * (1.0 - alpha) + f32::from(target) * alpha).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;
    use crate::overlay::tests::{system_font, white_png};

    #[test]
    fn test_font_size_follows_width() {
        assert_eq!(font_size(200), 24.0);
        assert_eq!(font_size(640), 32.0);
        assert_eq!(font_size(1792), 48.0);
    }

    #[test]
    fn test_blend_is_clipped_to_canvas() {
        let mut canvas = RgbImage::from_pixel(2, 2, Rgb(WHITE));
        blend(&mut canvas, -1, 0, BLACK, 1.0);
        blend(&mut canvas, 2, 1, BLACK, 1.0);
        blend(&mut canvas, 1, 1, BLACK, 0.5);
        assert_eq!(canvas.get_pixel(0, 0), &Rgb(WHITE));
        assert_eq!(canvas.get_pixel(1, 1), &Rgb([128, 128, 128]));
    }

    #[test]
    fn test_long_quote_wraps_inside_band() {
        let Some(font) = system_font() else { return };
        let quote = "Some libraries are burned so that their readers learn to carry every page \
                     inside them, quietly, for as long as the embers stay warm.";
        let layout = layout(1024, 1024, quote, &font);
        let scaled = font.as_scaled(layout.scale);

        assert!(layout.lines.len() > 3);
        assert!(layout.lines[0].starts_with('"'));
        assert_eq!(layout.lines[layout.lines.len() - 2], "");
        assert_eq!(layout.lines.last().map(String::as_str), Some(ATTRIBUTION));
        for line in &layout.lines {
            assert!(line_width(&scaled, line) <= 1024.0 * TEXT_WIDTH_RATIO);
        }
        assert!(layout.band.top > 1024.0 / 3.0);
        assert!((layout.band.bottom - (1024.0 - BOTTOM_MARGIN + BAND_PADDING)).abs() < 0.01);
    }

    #[test]
    fn test_band_is_darkened_and_text_is_white() {
        let Some(font) = system_font() else { return };
        let quote = "We kept the ashes warm.";
        let png = render(&white_png(512, 512), quote, &font).unwrap();
        let canvas = image::load_from_memory(&png).unwrap().to_rgb8();
        let band = layout(512, 512, quote, &font).band;

        assert_eq!(canvas.dimensions(), (512, 512));
        assert_eq!(canvas.get_pixel(0, 0), &Rgb(WHITE));
        assert_eq!(canvas.get_pixel(256, (band.top as u32).saturating_sub(5)), &Rgb(WHITE));

        // Band corner: white under 120/255 black.
        let corner = canvas.get_pixel(band.left as u32 + 2, band.top as u32 + 2);
        assert_eq!(corner, &Rgb([135, 135, 135]));

        let text_pixels = (band.top as u32..band.bottom as u32)
            .flat_map(|y| (band.left as u32..band.right as u32).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.get_pixel(x, y) == &Rgb(WHITE))
            .count();
        assert!(text_pixels > 0);
    }

    #[test]
    fn test_rejects_bytes_that_are_not_an_image() {
        let Some(font) = system_font() else { return };
        assert!(render(b"GIF89a-truncated", "quote", &font).is_err());
    }
}
