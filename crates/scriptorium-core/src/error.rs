//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::PostStatus;
use crate::ports::{BundleError, CredentialError, LockError};

/// Domain errors - business logic failures.
///
/// Every pipeline failure surfaces to the caller as one of these variants;
/// nothing is swallowed on the way up.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("No API key configured for the generation services")]
    MissingCredential,

    #[error("No quotes available in the quote bank")]
    EmptyPool,

    #[error("Image generation failed: {0}")]
    ImageGeneration(String),

    #[error("Caption generation failed: {0}")]
    CaptionGeneration(String),

    #[error("Cannot {action} post {id} while it is {from}")]
    InvalidTransition {
        id: Uuid,
        from: PostStatus,
        action: &'static str,
    },

    #[error("Post {0} has not been approved")]
    NotApproved(Uuid),

    #[error("Post {0} is being modified by another request")]
    Conflict(Uuid),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn post_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity_type: "Post",
            id,
        }
    }

    pub fn quote_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity_type: "Quote",
            id,
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        DomainError::Internal(err.to_string())
    }
}

impl From<CredentialError> for DomainError {
    fn from(err: CredentialError) -> Self {
        DomainError::Internal(err.to_string())
    }
}

impl From<LockError> for DomainError {
    fn from(err: LockError) -> Self {
        DomainError::Internal(err.to_string())
    }
}

impl From<BundleError> for DomainError {
    fn from(err: BundleError) -> Self {
        DomainError::Internal(err.to_string())
    }
}
