//! End-to-end pipeline runs over the in-memory adapters with stubbed generation services.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use scriptorium_core::DomainError;
use scriptorium_core::domain::caption::ATTRIBUTION;
use scriptorium_core::domain::{CallToAction, LengthClass, PostStatus, Quote};
use scriptorium_core::ports::{
    ApiKey, CaptionGenerator, CaptionRequest, CredentialStore, GenerationError, ImageGenerator,
    ImageRequest, ImageSize, QuoteStore,
};
use scriptorium_core::services::{
    ExportPackager, GenerationOrchestrator, GenerationPorts, GenerationSettings, PostLifecycle,
};
use scriptorium_infra::{
    EncryptedCredentialStore, InMemoryPostLock, InMemoryPostRepository, InMemoryQuoteStore,
    ZipBundleEncoder,
};

#[derive(Default)]
struct StubImages {
    calls: AtomicUsize,
    fail: AtomicBool,
    delay_ms: AtomicUsize,
    last_request: Mutex<Option<(String, ImageSize)>>,
}

#[async_trait]
impl ImageGenerator for StubImages {
    async fn generate_image(
        &self,
        _api_key: &ApiKey,
        request: &ImageRequest<'_>,
    ) -> Result<Vec<u8>, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((request.quote.to_string(), request.size));
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::Upstream {
                status: 500,
                message: "image backend down".to_string(),
            });
        }
        Ok(vec![0x89, b'P', b'N', b'G', call as u8])
    }
}

#[derive(Default)]
struct StubCaptions {
    calls: AtomicUsize,
    fail: AtomicBool,
}

#[async_trait]
impl CaptionGenerator for StubCaptions {
    async fn generate_caption(
        &self,
        _api_key: &ApiKey,
        request: &CaptionRequest<'_>,
    ) -> Result<String, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::Timeout(Duration::from_secs(60)));
        }
        Ok(format!("Caption {call} on {}. What did you keep?", request.theme))
    }
}

struct Harness {
    quotes: Arc<InMemoryQuoteStore>,
    posts: Arc<InMemoryPostRepository>,
    credentials: Arc<EncryptedCredentialStore>,
    images: Arc<StubImages>,
    captions: Arc<StubCaptions>,
    orchestrator: Arc<GenerationOrchestrator>,
    lifecycle: PostLifecycle,
    packager: ExportPackager,
}

fn quote(text: &str) -> Quote {
    Quote::new(
        text,
        "memory",
        "melancholic",
        LengthClass::Short,
        vec!["candlelight".to_string(), "ashes".to_string()],
    )
    .unwrap()
}

async fn harness(quotes: Vec<Quote>) -> Harness {
    let quotes = Arc::new(InMemoryQuoteStore::with_quotes(quotes));
    let posts = Arc::new(InMemoryPostRepository::new());
    let credentials = Arc::new(EncryptedCredentialStore::new("test-secret"));
    credentials.set_active_key(ApiKey::new("sk-test")).await.unwrap();
    let images = Arc::new(StubImages::default());
    let captions = Arc::new(StubCaptions::default());

    let orchestrator = Arc::new(GenerationOrchestrator::new(
        GenerationPorts {
            quotes: quotes.clone(),
            posts: posts.clone(),
            credentials: credentials.clone(),
            images: images.clone(),
            captions: captions.clone(),
            locks: Arc::new(InMemoryPostLock::new()),
        },
        GenerationSettings::default(),
    ));
    let lifecycle = PostLifecycle::new(posts.clone(), orchestrator.clone());
    let packager = ExportPackager::new(posts.clone(), quotes.clone(), Arc::new(ZipBundleEncoder::new()));

    Harness {
        quotes,
        posts,
        credentials,
        images,
        captions,
        orchestrator,
        lifecycle,
        packager,
    }
}

#[tokio::test]
async fn test_generation_uses_distinct_quotes_within_cooldown() {
    let h = harness(vec![quote("One"), quote("Two"), quote("Three")]).await;

    let mut seen = HashSet::new();
    for _ in 0..3 {
        let post = h.orchestrator.generate(None).await.unwrap();
        assert!(!post.forced_repeat);
        assert!(seen.insert(post.quote_id));
    }

    for q in h.quotes.list().await.unwrap() {
        assert_eq!(q.times_selected, 1);
        assert!(q.last_selected_at.is_some());
    }
}

#[tokio::test]
async fn test_exhausted_pool_forces_a_flagged_repeat() {
    let only = quote("Only one");
    let only_id = only.id;
    let h = harness(vec![only]).await;

    let first = h.orchestrator.generate(None).await.unwrap();
    let second = h.orchestrator.generate(None).await.unwrap();

    assert!(!first.forced_repeat);
    assert!(second.forced_repeat);
    assert_eq!(second.quote_id, only_id);
}

#[tokio::test]
async fn test_empty_quote_bank() {
    let h = harness(vec![]).await;
    let err = h.orchestrator.generate(None).await.unwrap_err();
    assert!(matches!(err, DomainError::EmptyPool));
    assert_eq!(h.images.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_credential_stores_nothing() {
    let quotes = Arc::new(InMemoryQuoteStore::with_quotes(vec![quote("One")]));
    let posts = Arc::new(InMemoryPostRepository::new());
    let images = Arc::new(StubImages::default());
    let orchestrator = GenerationOrchestrator::new(
        GenerationPorts {
            quotes,
            posts: posts.clone(),
            credentials: Arc::new(EncryptedCredentialStore::new("test-secret")),
            images: images.clone(),
            captions: Arc::new(StubCaptions::default()),
            locks: Arc::new(InMemoryPostLock::new()),
        },
        GenerationSettings::default(),
    );

    let err = orchestrator.generate(None).await.unwrap_err();
    assert!(matches!(err, DomainError::MissingCredential));
    assert!(posts.is_empty().await);
    assert_eq!(images.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_image_failure_skips_caption_and_storage() {
    let h = harness(vec![quote("One")]).await;
    h.images.fail.store(true, Ordering::SeqCst);

    let err = h.orchestrator.generate(None).await.unwrap_err();
    assert!(matches!(err, DomainError::ImageGeneration(_)));
    assert_eq!(h.captions.calls.load(Ordering::SeqCst), 0);
    assert!(h.posts.is_empty().await);

    // A failed run does not consume the quote.
    let stored = h.quotes.list().await.unwrap();
    assert_eq!(stored[0].times_selected, 0);
}

#[tokio::test]
async fn test_caption_failure_stores_nothing() {
    let h = harness(vec![quote("One")]).await;
    h.captions.fail.store(true, Ordering::SeqCst);

    let err = h.orchestrator.generate(None).await.unwrap_err();
    assert!(matches!(err, DomainError::CaptionGeneration(_)));
    assert_eq!(h.images.calls.load(Ordering::SeqCst), 1);
    assert!(h.posts.is_empty().await);
}

#[tokio::test]
async fn test_full_caption_layout_and_cta_rotation() {
    let h = harness(vec![quote("One"), quote("Two"), quote("Three")]).await;

    let first = h.orchestrator.generate(None).await.unwrap();
    let second = h.orchestrator.generate(None).await.unwrap();
    let third = h.orchestrator.generate(None).await.unwrap();

    assert_eq!(first.call_to_action, CallToAction::FollowForFragments.text());
    assert_eq!(second.call_to_action, CallToAction::JoinNewsletter.text());
    assert_eq!(third.call_to_action, first.call_to_action);

    assert!(first.full_caption.starts_with(&first.caption));
    assert!(first.full_caption.contains(ATTRIBUTION));
    assert!(first.full_caption.ends_with(&first.hashtags.join(" ")));
    assert!((5..=7).contains(&first.hashtags.len()));
}

#[tokio::test]
async fn test_failed_run_does_not_advance_cta() {
    let h = harness(vec![quote("One"), quote("Two")]).await;

    h.captions.fail.store(true, Ordering::SeqCst);
    assert!(h.orchestrator.generate(None).await.is_err());
    h.captions.fail.store(false, Ordering::SeqCst);

    let post = h.orchestrator.generate(None).await.unwrap();
    assert_eq!(post.call_to_action, CallToAction::FollowForFragments.text());
}

#[tokio::test]
async fn test_generate_with_explicit_quote() {
    let chosen = quote("Chosen");
    let chosen_id = chosen.id;
    let h = harness(vec![quote("Other"), chosen]).await;

    let post = h.orchestrator.generate(Some(chosen_id)).await.unwrap();
    assert_eq!(post.quote_id, chosen_id);
    assert_eq!(
        h.images.last_request.lock().unwrap().clone(),
        Some(("Chosen".to_string(), ImageSize::Square))
    );

    let err = h.orchestrator.generate(Some(Uuid::new_v4())).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "Quote", .. }));
}

#[tokio::test]
async fn test_approve_once() {
    let h = harness(vec![quote("One")]).await;
    let post = h.orchestrator.generate(None).await.unwrap();

    let approved = h.lifecycle.approve(post.id).await.unwrap();
    assert_eq!(approved.status, PostStatus::Approved);
    assert!(approved.approved_at.is_some());

    let err = h.lifecycle.approve(post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));

    assert!(h.lifecycle.list_pending().await.unwrap().is_empty());
    assert_eq!(h.lifecycle.list_approved().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_approve_unknown_post() {
    let h = harness(vec![quote("One")]).await;
    let err = h.lifecycle.approve(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "Post", .. }));
}

#[tokio::test]
async fn test_regenerate_replaces_content_in_place() {
    let h = harness(vec![quote("One"), quote("Two")]).await;
    let original = h.orchestrator.generate(None).await.unwrap();

    let regenerated = h.lifecycle.regenerate(original.id).await.unwrap();
    assert_eq!(regenerated.id, original.id);
    assert_eq!(regenerated.created_at, original.created_at);
    assert_eq!(regenerated.status, PostStatus::Pending);
    assert_ne!(regenerated.image, original.image);
    assert_ne!(regenerated.caption, original.caption);
    assert_ne!(regenerated.quote_id, original.quote_id);
    assert_eq!(h.posts.len().await, 1);
}

#[tokio::test]
async fn test_regenerate_approved_post_is_rejected() {
    let h = harness(vec![quote("One")]).await;
    let post = h.orchestrator.generate(None).await.unwrap();
    h.lifecycle.approve(post.id).await.unwrap();

    let err = h.lifecycle.regenerate(post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));
    assert_eq!(h.images.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_regenerations_conflict() {
    let h = harness(vec![quote("One"), quote("Two")]).await;
    let post = h.orchestrator.generate(None).await.unwrap();
    h.images.delay_ms.store(300, Ordering::SeqCst);

    let orchestrator = h.orchestrator.clone();
    let first = tokio::spawn(async move { orchestrator.regenerate(post.id).await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = h.orchestrator.regenerate(post.id).await;
    assert!(matches!(second, Err(DomainError::Conflict(id)) if id == post.id));

    // Approval contends for the same lock.
    let approve = h.lifecycle.approve(post.id).await;
    assert!(matches!(approve, Err(DomainError::Conflict(_))));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.id, post.id);

    // Lock released once the winner is done.
    h.images.delay_ms.store(0, Ordering::SeqCst);
    assert!(h.lifecycle.approve(post.id).await.is_ok());
}

#[tokio::test]
async fn test_export_requires_approval() {
    let h = harness(vec![quote("Ash remembers.")]).await;
    let post = h.orchestrator.generate(None).await.unwrap();

    let err = h.packager.package(post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotApproved(id) if id == post.id));

    h.lifecycle.approve(post.id).await.unwrap();
    let bundle = h.packager.package(post.id).await.unwrap();
    assert_eq!(bundle.file_name, format!("ember_post_{}.zip", post.id));
    assert_eq!(bundle.content_type, "application/zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
    let mut caption = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name(&format!("caption_{}.txt", post.id)).unwrap(),
        &mut caption,
    )
    .unwrap();
    assert!(caption.starts_with(&post.full_caption));
    assert!(caption.contains("Generated: "));
    assert!(caption.ends_with("Quote: Ash remembers."));
    assert!(archive.by_name(&format!("image_{}.png", post.id)).is_ok());
}

#[tokio::test]
async fn test_export_is_read_only() {
    let h = harness(vec![quote("One")]).await;
    let post = h.orchestrator.generate(None).await.unwrap();
    let approved = h.lifecycle.approve(post.id).await.unwrap();

    h.packager.package(post.id).await.unwrap();
    h.packager.package(post.id).await.unwrap();

    let stored = h.lifecycle.get(post.id).await.unwrap();
    assert_eq!(stored, approved);
    assert!(h.credentials.get_active_key().await.unwrap().is_some());
}
