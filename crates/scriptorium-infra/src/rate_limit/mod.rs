//! Rate limiting for routes that spend external API quota.

mod memory;

pub use memory::{InMemoryRateLimiter, RateLimitConfig};
