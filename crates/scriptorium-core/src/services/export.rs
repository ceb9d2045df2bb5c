//! Export of approved posts as a downloadable bundle.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, PostStatus, Quote};
use crate::error::DomainError;
use crate::ports::{BaseRepository, Bundle, BundleEncoder, BundleEntry, PostRepository, QuoteStore};

/// An encoded bundle ready to be served.
#[derive(Debug, Clone)]
pub struct PackagedBundle {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Read-only packager: never mutates posts or quotes.
pub struct ExportPackager {
    posts: Arc<dyn PostRepository>,
    quotes: Arc<dyn QuoteStore>,
    encoder: Arc<dyn BundleEncoder>,
}

impl ExportPackager {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        quotes: Arc<dyn QuoteStore>,
        encoder: Arc<dyn BundleEncoder>,
    ) -> Self {
        Self {
            posts,
            quotes,
            encoder,
        }
    }

    pub async fn package(&self, post_id: Uuid) -> Result<PackagedBundle, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;

        if post.status != PostStatus::Approved {
            return Err(DomainError::NotApproved(post_id));
        }

        // The quote may have been removed from the bank since approval.
        let quote = self.quotes.get(post.quote_id).await?;

        let bundle = build_bundle(&post, quote.as_ref());
        let bytes = self.encoder.encode(&bundle)?;

        tracing::info!(post_id = %post_id, size = bytes.len(), "Post exported");

        Ok(PackagedBundle {
            file_name: format!("{}.{}", bundle.name, self.encoder.extension()),
            content_type: self.encoder.content_type(),
            bytes,
        })
    }
}

fn build_bundle(post: &Post, quote: Option<&Quote>) -> Bundle {
    let mut caption = format!(
        "{}\n\nGenerated: {}",
        post.full_caption,
        post.created_at.to_rfc3339()
    );
    if let Some(quote) = quote {
        caption.push_str(&format!("\nQuote: {}", quote.text));
    }

    Bundle {
        name: format!("ember_post_{}", post.id),
        entries: vec![
            BundleEntry {
                name: format!("image_{}.png", post.id),
                contents: post.image.clone(),
            },
            BundleEntry {
                name: format!("caption_{}.txt", post.id),
                contents: caption.into_bytes(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Draft, LengthClass};

    #[test]
    fn test_bundle_layout() {
        let quote = Quote::new("Ash remembers.", "fire", "quiet", LengthClass::Short, vec![]).unwrap();
        let post = Post::from_draft(Draft {
            quote_id: quote.id,
            image: vec![0x89, b'P', b'N', b'G'],
            caption: "c".into(),
            hashtags: vec![],
            call_to_action: "cta".into(),
            full_caption: "full caption".into(),
            forced_repeat: false,
        });

        let bundle = build_bundle(&post, Some(&quote));
        assert_eq!(bundle.name, format!("ember_post_{}", post.id));
        assert_eq!(bundle.entries[0].name, format!("image_{}.png", post.id));
        assert_eq!(bundle.entries[0].contents, post.image);

        let text = String::from_utf8(bundle.entries[1].contents.clone()).unwrap();
        assert!(text.starts_with("full caption\n\nGenerated: "));
        assert!(text.ends_with("Quote: Ash remembers."));

        let without_quote = build_bundle(&post, None);
        let text = String::from_utf8(without_quote.entries[1].contents.clone()).unwrap();
        assert!(!text.contains("Quote:"));
    }
}
