//! In-memory post lock - used when Redis is unavailable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use scriptorium_core::ports::{LockError, LockToken, PostLock};

struct LockEntry {
    token: LockToken,
    expires_at: Instant,
}

/// Process-local lock table keyed by post id.
///
/// Note: Locks are per-process, not shared across instances.
#[derive(Default)]
pub struct InMemoryPostLock {
    held: Mutex<HashMap<Uuid, LockEntry>>,
}

impl InMemoryPostLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostLock for InMemoryPostLock {
    async fn try_acquire(&self, post_id: Uuid, ttl: Duration) -> Result<Option<LockToken>, LockError> {
        let mut held = self.held.lock().await;
        let now = Instant::now();

        if let Some(entry) = held.get(&post_id) {
            if entry.expires_at > now {
                return Ok(None);
            }
            tracing::warn!(post_id = %post_id, "Reclaiming expired post lock");
        }

        let token = LockToken::new();
        held.insert(
            post_id,
            LockEntry {
                token,
                expires_at: now + ttl,
            },
        );
        Ok(Some(token))
    }

    async fn release(&self, post_id: Uuid, token: LockToken) -> Result<(), LockError> {
        let mut held = self.held.lock().await;
        if held.get(&post_id).is_some_and(|entry| entry.token == token) {
            held.remove(&post_id);
        }
        Ok(())
    }
}
