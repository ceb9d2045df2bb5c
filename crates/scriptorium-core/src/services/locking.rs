use std::future::Future;
use std::time::Duration;

use uuid::Uuid;

use crate::error::DomainError;
use crate::ports::PostLock;

/// Run `op` while holding the lock for `post_id`.
///
/// A held lock fails fast with `Conflict`; the caller never waits on another
/// request's external calls.
pub(crate) async fn with_post_lock<T, F>(
    locks: &dyn PostLock,
    post_id: Uuid,
    ttl: Duration,
    op: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    let token = match locks.try_acquire(post_id, ttl).await? {
        Some(token) => token,
        None => {
            tracing::warn!(post_id = %post_id, "Post is locked by another request");
            return Err(DomainError::Conflict(post_id));
        }
    };

    let result = op.await;

    // An unreleased lock expires after its TTL, so a failed release is not fatal.
    if let Err(e) = locks.release(post_id, token).await {
        tracing::warn!(post_id = %post_id, error = %e, "Failed to release post lock");
    }

    result
}
