//! Credential decryption port.

use crate::source::domain::{EncryptedCredential, SecretToken};
use thiserror::Error;

/// Turns a stored credential blob into a usable tracker credential.
///
/// Implementations wrap the at-rest encryption helper. Connectors call this
/// immediately before authenticating and never cache the plaintext.
pub trait CredentialResolver: Send + Sync {
    /// Decrypts a credential blob.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when the blob cannot be decrypted.
    fn decrypt(&self, credential: &EncryptedCredential) -> Result<SecretToken, CredentialError>;
}

/// Errors returned by credential resolvers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// No key or entry exists for the credential.
    #[error("no credential registered for the stored reference")]
    Unknown,

    /// The blob exists but could not be decrypted.
    #[error("credential could not be decrypted: {0}")]
    Undecryptable(String),
}
