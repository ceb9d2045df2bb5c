//! Credential port - the single API key used by the generation services.

use std::fmt;

use async_trait::async_trait;

/// A secret API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Credential store - how the key is protected at rest is up to the implementation.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The active key, or `None` when none is configured.
    async fn get_active_key(&self) -> Result<Option<ApiKey>, CredentialError>;

    /// Replace the active key.
    async fn set_active_key(&self, key: ApiKey) -> Result<(), CredentialError>;
}

/// Credential storage errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Storage failed: {0}")]
    Storage(String),
}
