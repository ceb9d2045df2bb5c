//! Quote and post persistence - PostgreSQL via SeaORM, with in-memory fallback.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
#[cfg(feature = "postgres")]
pub use connections::connect;
pub use memory::{InMemoryPostRepository, InMemoryQuoteStore};

#[cfg(feature = "postgres")]
pub use postgres_repo::{PostgresPostRepository, PostgresQuoteStore};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
