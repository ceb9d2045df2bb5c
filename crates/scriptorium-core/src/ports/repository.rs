use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, PostStatus, Quote};
use crate::error::RepoError;

/// Generic repository trait for entities stored by id.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Posts in a given status, most recently created first.
    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError>;
}

/// Quote store - the quote bank plus per-quote selection metadata.
///
/// The pipeline never creates or deletes quotes; `replace_all` exists for the
/// ingestion side only.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Snapshot of the whole collection.
    async fn list(&self) -> Result<Vec<Quote>, RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<Quote>, RepoError>;

    /// Stamp a selection of the quote. Returns `RepoError::NotFound` for unknown ids.
    async fn record_selection(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;

    /// Replace the whole bank, returning the number of stored quotes.
    async fn replace_all(&self, quotes: Vec<Quote>) -> Result<usize, RepoError>;
}
