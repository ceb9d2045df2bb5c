//! # Scriptorium Infrastructure
//!
//! Concrete implementations of the ports defined in `scriptorium-core`:
//! persistence, per-post locking, credential storage, export encoding, the
//! OpenAI generation services and the quote overlay.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL persistence via SeaORM
//! - `rate-limit` - Rate limiting via governor
//! - `redis` - Redis-backed per-post locks

pub mod credentials;
pub mod database;
pub mod export;
pub mod lock;
pub mod openai;
pub mod overlay;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use credentials::EncryptedCredentialStore;
pub use database::{DatabaseConfig, InMemoryPostRepository, InMemoryQuoteStore};
pub use export::ZipBundleEncoder;
pub use lock::InMemoryPostLock;
pub use openai::{OpenAiCaptionGenerator, OpenAiConfig, OpenAiImageGenerator};
pub use overlay::{OverlayConfig, QuoteOverlayImageGenerator};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

// Re-exports - External services
#[cfg(feature = "postgres")]
pub use database::{PostgresPostRepository, PostgresQuoteStore};
#[cfg(feature = "redis")]
pub use lock::{RedisConfig, RedisPostLock};
