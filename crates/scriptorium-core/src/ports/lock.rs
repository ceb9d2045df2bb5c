//! Per-post lock port.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

/// Proof of lock ownership, required to release it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockToken(pub Uuid);

impl LockToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LockToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutual exclusion keyed by post id.
///
/// Locks expire after their TTL so a crashed holder cannot block a post forever.
#[async_trait]
pub trait PostLock: Send + Sync {
    /// Try to take the lock without waiting. `None` means another holder has it.
    async fn try_acquire(&self, post_id: Uuid, ttl: Duration) -> Result<Option<LockToken>, LockError>;

    /// Release the lock if `token` still owns it.
    async fn release(&self, post_id: Uuid, token: LockToken) -> Result<(), LockError>;
}

/// Lock backend errors.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Lock backend error: {0}")]
    Backend(String),
}
