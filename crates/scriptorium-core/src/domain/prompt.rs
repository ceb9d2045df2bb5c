//! Image prompt construction.

use super::Quote;

const STYLE: &str = "Oil painting, dark academia aesthetic";
const MOOD: &str =
    "moody cinematic lighting, poetic atmosphere, muted earth tones, candlelight gold, deep shadows";
const FINISH: &str = "Classical painting style, romantic period, atmospheric depth.";

/// Build the image prompt for a quote.
///
/// Deterministic: the same quote always yields the same prompt text, with the
/// visual keywords in their stored order.
pub fn image_prompt(quote: &Quote) -> String {
    let mut prompt = String::from(STYLE);
    if !quote.visual_keywords.is_empty() {
        prompt.push_str(" — ");
        prompt.push_str(&quote.visual_keywords.join(", "));
    }
    prompt.push_str(" — ");
    prompt.push_str(MOOD);
    prompt.push_str(&format!(" — inspired by the quote: '{}'. {}", quote.text, FINISH));
    prompt
}
