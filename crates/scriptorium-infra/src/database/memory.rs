//! In-memory quote and post stores - used when no database is configured.
//!
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use scriptorium_core::domain::{Post, PostStatus, Quote};
use scriptorium_core::error::RepoError;
use scriptorium_core::ports::{BaseRepository, PostRepository, QuoteStore};

/// In-memory quote bank. Keeps ingestion order for listing.
#[derive(Default)]
pub struct InMemoryQuoteStore {
    quotes: RwLock<Vec<Quote>>,
}

impl InMemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quotes(quotes: Vec<Quote>) -> Self {
        Self {
            quotes: RwLock::new(quotes),
        }
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn list(&self) -> Result<Vec<Quote>, RepoError> {
        Ok(self.quotes.read().await.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Quote>, RepoError> {
        Ok(self.quotes.read().await.iter().find(|q| q.id == id).cloned())
    }

    async fn record_selection(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let mut quotes = self.quotes.write().await;
        let quote = quotes
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(RepoError::NotFound)?;
        quote.record_selection(at);
        Ok(())
    }

    async fn replace_all(&self, quotes: Vec<Quote>) -> Result<usize, RepoError> {
        let mut store = self.quotes.write().await;
        *store = quotes;
        Ok(store.len())
    }
}

/// In-memory post repository.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}
