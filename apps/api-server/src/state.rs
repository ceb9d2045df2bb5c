//! Application state - shared across all handlers.

use std::sync::Arc;

use scriptorium_core::ports::{
    ApiKey, CredentialStore, ImageGenerator, PostLock, PostRepository, QuoteStore, RateLimiter,
};
use scriptorium_core::services::{
    ExportPackager, GenerationOrchestrator, GenerationPorts, PostLifecycle,
};
use scriptorium_infra::{
    EncryptedCredentialStore, InMemoryPostLock, InMemoryPostRepository, InMemoryQuoteStore,
    OpenAiCaptionGenerator, OpenAiImageGenerator, QuoteOverlayImageGenerator, ZipBundleEncoder,
};

#[cfg(feature = "postgres")]
use scriptorium_infra::{PostgresPostRepository, PostgresQuoteStore, database};
#[cfg(feature = "rate-limit")]
use scriptorium_infra::InMemoryRateLimiter;
#[cfg(feature = "redis")]
use scriptorium_infra::RedisPostLock;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<dyn QuoteStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub lifecycle: Arc<PostLifecycle>,
    pub packager: Arc<ExportPackager>,
    /// Guards the generation routes; `None` disables limiting.
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
}

/// Adapter set the services are wired from.
pub struct Adapters {
    pub quotes: Arc<dyn QuoteStore>,
    pub posts: Arc<dyn PostRepository>,
    pub credentials: Arc<dyn CredentialStore>,
    pub locks: Arc<dyn PostLock>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (quotes, posts) = stores(config).await;
        let locks = post_lock(config).await;

        let credentials: Arc<dyn CredentialStore> = Arc::new(EncryptedCredentialStore::from_env());
        if let Some(key) = &config.openai_api_key {
            match credentials.set_active_key(ApiKey::new(key.clone())).await {
                Ok(()) => tracing::info!("API key loaded from OPENAI_API_KEY"),
                Err(e) => tracing::error!(error = %e, "Failed to store API key from environment"),
            }
        }

        #[cfg(feature = "rate-limit")]
        let rate_limiter: Option<Arc<dyn RateLimiter>> = {
            tracing::info!(
                max_requests = config.rate_limit.max_requests,
                window_secs = config.rate_limit.window.as_secs(),
                "Generation rate limit enabled"
            );
            Some(Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone())))
        };
        #[cfg(not(feature = "rate-limit"))]
        let rate_limiter: Option<Arc<dyn RateLimiter>> = None;

        let state = Self::from_adapters(
            Adapters {
                quotes,
                posts,
                credentials,
                locks,
            },
            config,
            rate_limiter,
        );

        tracing::info!("Application state initialized");
        state
    }

    /// Wire the services over a given adapter set; the OpenAI adapters come from `config`.
    pub fn from_adapters(
        adapters: Adapters,
        config: &AppConfig,
        rate_limiter: Option<Arc<dyn RateLimiter>>,
    ) -> Self {
        let openai_images = OpenAiImageGenerator::new(config.openai.clone());
        let images: Arc<dyn ImageGenerator> = if config.overlay.enabled {
            Arc::new(QuoteOverlayImageGenerator::new(openai_images, &config.overlay))
        } else {
            tracing::info!("Quote overlay disabled");
            Arc::new(openai_images)
        };

        let ports = GenerationPorts {
            quotes: adapters.quotes.clone(),
            posts: adapters.posts.clone(),
            credentials: adapters.credentials.clone(),
            images,
            captions: Arc::new(OpenAiCaptionGenerator::new(config.openai.clone())),
            locks: adapters.locks,
        };
        Self::from_ports(ports, config, rate_limiter)
    }

    pub fn from_ports(
        ports: GenerationPorts,
        config: &AppConfig,
        rate_limiter: Option<Arc<dyn RateLimiter>>,
    ) -> Self {
        let quotes = ports.quotes.clone();
        let posts = ports.posts.clone();
        let credentials = ports.credentials.clone();

        let orchestrator = Arc::new(GenerationOrchestrator::new(ports, config.generation.clone()));
        let lifecycle = Arc::new(PostLifecycle::new(posts.clone(), orchestrator.clone()));
        let packager = Arc::new(ExportPackager::new(
            posts,
            quotes.clone(),
            Arc::new(ZipBundleEncoder::new()),
        ));

        Self {
            quotes,
            credentials,
            orchestrator,
            lifecycle,
            packager,
            rate_limiter,
        }
    }
}

fn in_memory_stores() -> (Arc<dyn QuoteStore>, Arc<dyn PostRepository>) {
    (
        Arc::new(InMemoryQuoteStore::new()),
        Arc::new(InMemoryPostRepository::new()),
    )
}

#[cfg(feature = "postgres")]
async fn stores(config: &AppConfig) -> (Arc<dyn QuoteStore>, Arc<dyn PostRepository>) {
    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return in_memory_stores();
    };

    match database::connect(db_config).await {
        Ok(conn) => (
            Arc::new(PostgresQuoteStore::new(conn.clone())),
            Arc::new(PostgresPostRepository::new(conn)),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            in_memory_stores()
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn stores(config: &AppConfig) -> (Arc<dyn QuoteStore>, Arc<dyn PostRepository>) {
    if config.database.is_some() {
        tracing::warn!("DATABASE_URL set but the postgres feature is disabled");
    }
    tracing::info!("Running without postgres feature - using in-memory stores");
    in_memory_stores()
}

#[cfg(feature = "redis")]
async fn post_lock(config: &AppConfig) -> Arc<dyn PostLock> {
    let Some(redis_config) = &config.redis else {
        tracing::info!("REDIS_URL not set. Using in-process post locks.");
        return Arc::new(InMemoryPostLock::new());
    };

    match RedisPostLock::new(redis_config.clone()).await {
        Ok(lock) => Arc::new(lock),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Redis. Using in-process post locks.");
            Arc::new(InMemoryPostLock::new())
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn post_lock(_config: &AppConfig) -> Arc<dyn PostLock> {
    Arc::new(InMemoryPostLock::new())
}
