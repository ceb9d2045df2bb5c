//! # Scriptorium Core
//!
//! The domain layer of the Ember Scriptorium post pipeline.
//! Quote selection, post generation, approval and export live here as pure
//! business logic; every external concern is reached through a port.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
