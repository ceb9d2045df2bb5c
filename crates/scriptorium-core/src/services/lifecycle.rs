//! Post lifecycle: `pending -> approved`, in-place regeneration while pending.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Post, PostStatus};
use crate::error::DomainError;
use crate::ports::{BaseRepository, PostRepository};

use super::locking::with_post_lock;
use super::orchestrator::GenerationOrchestrator;

pub struct PostLifecycle {
    posts: Arc<dyn PostRepository>,
    orchestrator: Arc<GenerationOrchestrator>,
}

impl PostLifecycle {
    pub fn new(posts: Arc<dyn PostRepository>, orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self {
            posts,
            orchestrator,
        }
    }

    pub async fn get(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))
    }

    /// Approve a pending post.
    ///
    /// Shares the per-post lock with regeneration, so an approval can never be
    /// overwritten by a regeneration that was already in flight.
    pub async fn approve(&self, post_id: Uuid) -> Result<Post, DomainError> {
        let ttl = self.orchestrator.settings().lock_ttl;
        with_post_lock(self.orchestrator.locks(), post_id, ttl, async {
            let mut post = self.get(post_id).await?;
            post.approve(Utc::now())?;
            let post = self.posts.save(post).await?;

            tracing::info!(post_id = %post.id, "Post approved");
            Ok(post)
        })
        .await
    }

    pub async fn regenerate(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.orchestrator.regenerate(post_id).await
    }

    /// Pending posts, newest first.
    pub async fn list_pending(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_status(PostStatus::Pending).await?)
    }

    /// Approved posts, newest first.
    pub async fn list_approved(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_status(PostStatus::Approved).await?)
    }
}
