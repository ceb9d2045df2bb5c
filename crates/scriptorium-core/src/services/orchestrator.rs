//! Generation orchestrator.
//!
//! One run resolves the API key, draws a quote, calls the image service, then
//! the caption service, and composes the full caption. Any failure aborts the
//! run before anything is written, so a stored post always has both its image
//! and its caption.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::caption;
use crate::domain::prompt::image_prompt;
use crate::domain::{CtaRotation, Draft, Post};
use crate::error::DomainError;
use crate::ports::{
    BaseRepository, CaptionGenerator, CaptionRequest, CredentialStore, ImageGenerator, ImageRequest,
    ImageSize, PostLock, PostRepository, QuoteStore,
};

use super::locking::with_post_lock;
use super::selector::{DEFAULT_COOLDOWN_DAYS, QuoteSelector, Selection};

/// Adapters the orchestrator drives.
#[derive(Clone)]
pub struct GenerationPorts {
    pub quotes: Arc<dyn QuoteStore>,
    pub posts: Arc<dyn PostRepository>,
    pub credentials: Arc<dyn CredentialStore>,
    pub images: Arc<dyn ImageGenerator>,
    pub captions: Arc<dyn CaptionGenerator>,
    pub locks: Arc<dyn PostLock>,
}

/// Tunables for generation runs.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Cooldown before a quote may be drawn again (0 disables it).
    pub cooldown_days: u32,
    pub image_size: ImageSize,
    /// How long a per-post lock survives a holder that never releases it.
    pub lock_ttl: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            cooldown_days: DEFAULT_COOLDOWN_DAYS,
            image_size: ImageSize::Square,
            lock_ttl: Duration::from_secs(300),
        }
    }
}

pub struct GenerationOrchestrator {
    ports: GenerationPorts,
    selector: QuoteSelector,
    rotation: CtaRotation,
    settings: GenerationSettings,
}

impl GenerationOrchestrator {
    pub fn new(ports: GenerationPorts, settings: GenerationSettings) -> Self {
        let selector = QuoteSelector::new(ports.quotes.clone(), settings.cooldown_days);
        Self {
            ports,
            selector,
            rotation: CtaRotation::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub(crate) fn locks(&self) -> &dyn PostLock {
        self.ports.locks.as_ref()
    }

    /// Generate and store a new pending post.
    ///
    /// With `quote_id` the given quote is used instead of a cooldown draw.
    pub async fn generate(&self, quote_id: Option<Uuid>) -> Result<Post, DomainError> {
        let draft = self.run(quote_id).await?;
        let quote_id = draft.quote_id;

        let post = self.ports.posts.save(Post::from_draft(draft)).await?;
        self.record_selection(quote_id).await;

        tracing::info!(
            post_id = %post.id,
            quote_id = %post.quote_id,
            forced_repeat = post.forced_repeat,
            "Post generated"
        );
        Ok(post)
    }

    /// Redraw the quote and regenerate image and caption of a pending post in place.
    pub async fn regenerate(&self, post_id: Uuid) -> Result<Post, DomainError> {
        with_post_lock(self.locks(), post_id, self.settings.lock_ttl, async {
            let mut post = self
                .ports
                .posts
                .find_by_id(post_id)
                .await?
                .ok_or_else(|| DomainError::post_not_found(post_id))?;
            post.ensure_pending("regenerate")?;

            let draft = self.run(None).await?;
            let quote_id = draft.quote_id;
            post.apply_draft(draft)?;

            let post = self.ports.posts.save(post).await?;
            self.record_selection(quote_id).await;

            tracing::info!(
                post_id = %post.id,
                quote_id = %post.quote_id,
                forced_repeat = post.forced_repeat,
                "Post regenerated"
            );
            Ok(post)
        })
        .await
    }

    /// Everything up to, but excluding, persistence.
    async fn run(&self, quote_id: Option<Uuid>) -> Result<Draft, DomainError> {
        let api_key = self
            .ports
            .credentials
            .get_active_key()
            .await?
            .ok_or(DomainError::MissingCredential)?;

        let Selection {
            quote,
            forced_repeat,
        } = match quote_id {
            Some(id) => {
                let quote = self
                    .ports
                    .quotes
                    .get(id)
                    .await?
                    .ok_or_else(|| DomainError::quote_not_found(id))?;
                Selection {
                    quote,
                    forced_repeat: false,
                }
            }
            None => self.selector.draw(Utc::now()).await?,
        };

        let prompt = image_prompt(&quote);
        tracing::debug!(quote_id = %quote.id, size = %self.settings.image_size, "Requesting image");
        let image_request = ImageRequest {
            prompt: &prompt,
            quote: &quote.text,
            size: self.settings.image_size,
        };
        let image = self
            .ports
            .images
            .generate_image(&api_key, &image_request)
            .await
            .map_err(|e| {
                tracing::warn!(quote_id = %quote.id, error = %e, "Image generation failed");
                DomainError::ImageGeneration(e.to_string())
            })?;

        let request = CaptionRequest {
            quote: &quote.text,
            theme: &quote.theme,
            tone: &quote.tone,
        };
        let text = self
            .ports
            .captions
            .generate_caption(&api_key, &request)
            .await
            .map_err(|e| {
                tracing::warn!(quote_id = %quote.id, error = %e, "Caption generation failed");
                DomainError::CaptionGeneration(e.to_string())
            })?;

        let composed = caption::compose(&text, &quote.theme, &quote.tone, self.rotation.advance());

        Ok(Draft {
            quote_id: quote.id,
            image,
            caption: composed.caption,
            hashtags: composed.hashtags,
            call_to_action: composed.call_to_action,
            full_caption: composed.full_caption,
            forced_repeat,
        })
    }

    async fn record_selection(&self, quote_id: Uuid) {
        // Last write wins; a lost record only risks an early repeat.
        if let Err(e) = self.ports.quotes.record_selection(quote_id, Utc::now()).await {
            tracing::warn!(quote_id = %quote_id, error = %e, "Failed to record quote selection");
        }
    }
}
