//! Per-post lock implementations - Redis and in-memory fallback.

mod memory;

pub use memory::InMemoryPostLock;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisPostLock};
