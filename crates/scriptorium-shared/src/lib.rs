//! # Scriptorium Shared
//!
//! Wire types shared between the API server and the review dashboard.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
