//! Credential store implementations.

mod encrypted;

pub use encrypted::EncryptedCredentialStore;
