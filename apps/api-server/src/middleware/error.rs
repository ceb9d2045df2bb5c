//! Error handling middleware - RFC 7807 compliant responses.

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use scriptorium_core::error::{DomainError, RepoError};
use scriptorium_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
///
/// Causes sharing a status code carry distinct problem types so the dashboard
/// can tell "configure a key" apart from "upload quotes" or "try again".
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    MissingCredential,
    EmptyPool,
    UpstreamImage(String),
    UpstreamCaption(String),
    InvalidTransition(String),
    NotApproved(String),
    Conflict(String),
    Validation(Vec<String>),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::MissingCredential => write!(f, "No API key configured"),
            AppError::EmptyPool => write!(f, "Quote bank is empty"),
            AppError::UpstreamImage(msg) => write!(f, "Image service failed: {}", msg),
            AppError::UpstreamCaption(msg) => write!(f, "Caption service failed: {}", msg),
            AppError::InvalidTransition(msg) => write!(f, "Invalid transition: {}", msg),
            AppError::NotApproved(msg) => write!(f, "Not approved: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation errors: {:?}", errors),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::EmptyPool => StatusCode::NOT_FOUND,
            AppError::MissingCredential => StatusCode::BAD_REQUEST,
            AppError::UpstreamImage(_) | AppError::UpstreamCaption(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidTransition(_) | AppError::NotApproved(_) | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::MissingCredential => ErrorResponse::new(400, "Missing API Key")
                .with_type("missing-credential")
                .with_detail("Configure an API key in settings before generating posts."),
            AppError::EmptyPool => ErrorResponse::new(404, "Quote Bank Empty")
                .with_type("empty-pool")
                .with_detail("Upload quotes before generating posts."),
            AppError::UpstreamImage(detail) => ErrorResponse::new(502, "Image Generation Failed")
                .with_type("upstream-image")
                .with_detail(detail),
            AppError::UpstreamCaption(detail) => {
                ErrorResponse::new(502, "Caption Generation Failed")
                    .with_type("upstream-caption")
                    .with_detail(detail)
            }
            AppError::InvalidTransition(detail) => ErrorResponse::conflict(detail)
                .with_type("invalid-transition"),
            AppError::NotApproved(detail) => {
                ErrorResponse::conflict(detail).with_type("not-approved")
            }
            AppError::Conflict(detail) => ErrorResponse::conflict(detail).with_type("conflict"),
            AppError::Validation(errors) => {
                ErrorResponse::new(422, "Validation Failed").with_detail(errors.join(", "))
            }
            AppError::Internal(detail) => {
                // Log internal errors
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let detail = err.to_string();
        match err {
            DomainError::NotFound { .. } => AppError::NotFound(detail),
            DomainError::MissingCredential => AppError::MissingCredential,
            DomainError::EmptyPool => AppError::EmptyPool,
            DomainError::ImageGeneration(_) => AppError::UpstreamImage(detail),
            DomainError::CaptionGeneration(_) => AppError::UpstreamCaption(detail),
            DomainError::InvalidTransition { .. } => AppError::InvalidTransition(detail),
            DomainError::NotApproved(_) => AppError::NotApproved(detail),
            DomainError::Conflict(_) => AppError::Conflict(detail),
            DomainError::Validation(msg) => AppError::Validation(vec![msg]),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
