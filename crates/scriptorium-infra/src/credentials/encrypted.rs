//! Credential store keeping the API key AES-256-GCM encrypted at rest.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use scriptorium_core::ports::{ApiKey, CredentialError, CredentialStore};

const NONCE_LEN: usize = 12;

/// Holds at most one API key, stored as base64(nonce || ciphertext).
pub struct EncryptedCredentialStore {
    cipher: Aes256Gcm,
    sealed: RwLock<Option<String>>,
}

impl EncryptedCredentialStore {
    /// Derive the 256-bit cipher key from a secret with SHA-256.
    pub fn new(encryption_secret: &str) -> Self {
        let key_bytes = Sha256::digest(encryption_secret.as_bytes());
        Self {
            cipher: Aes256Gcm::new(&key_bytes),
            sealed: RwLock::new(None),
        }
    }

    /// Build from `ENCRYPTION_KEY`, falling back to a random per-process secret.
    pub fn from_env() -> Self {
        match std::env::var("ENCRYPTION_KEY") {
            Ok(secret) if !secret.is_empty() => Self::new(&secret),
            _ => {
                tracing::warn!("ENCRYPTION_KEY not set. Using an ephemeral encryption key.");
                let mut secret = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut secret);
                Self::new(&STANDARD.encode(secret))
            }
        }
    }

    fn seal(&self, plaintext: &str) -> Result<String, CredentialError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CredentialError::Encryption(e.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(combined))
    }

    fn open(&self, sealed: &str) -> Result<String, CredentialError> {
        let combined = STANDARD
            .decode(sealed)
            .map_err(|e| CredentialError::Decryption(format!("invalid base64: {e}")))?;

        if combined.len() < NONCE_LEN {
            return Err(CredentialError::Decryption("sealed key too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| CredentialError::Decryption(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CredentialError::Decryption(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for EncryptedCredentialStore {
    async fn get_active_key(&self) -> Result<Option<ApiKey>, CredentialError> {
        let sealed = self.sealed.read().await;
        sealed
            .as_deref()
            .map(|s| self.open(s).map(ApiKey::new))
            .transpose()
    }

    async fn set_active_key(&self, key: ApiKey) -> Result<(), CredentialError> {
        let sealed = self.seal(key.expose())?;
        *self.sealed.write().await = Some(sealed);
        tracing::info!("API key updated");
        Ok(())
    }
}
