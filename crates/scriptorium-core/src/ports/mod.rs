//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod bundle;
mod credentials;
mod generation;
mod lock;
mod rate_limit;
mod repository;

pub use bundle::{Bundle, BundleEncoder, BundleEntry, BundleError};
pub use credentials::{ApiKey, CredentialError, CredentialStore};
pub use generation::{
    CaptionGenerator, CaptionRequest, GenerationError, ImageGenerator, ImageRequest, ImageSize,
};
pub use lock::{LockError, LockToken, PostLock};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{BaseRepository, PostRepository, QuoteStore};
