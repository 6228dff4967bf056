//! Credential value objects.
//!
//! Sources only ever hold the encrypted blob. Decryption happens through the
//! [`CredentialResolver`](crate::source::ports::CredentialResolver) port just
//! before a connector calls the tracker.

use super::SourceDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encrypted tracker credential as stored on a task source.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedCredential(String);

impl EncryptedCredential {
    /// Wraps an encrypted credential blob.
    ///
    /// # Errors
    ///
    /// Returns [`SourceDomainError::EmptyCredential`] when the blob is empty.
    pub fn new(blob: impl Into<String>) -> Result<Self, SourceDomainError> {
        let raw = blob.into();
        if raw.trim().is_empty() {
            return Err(SourceDomainError::EmptyCredential);
        }
        Ok(Self(raw))
    }

    /// Returns the encrypted blob.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EncryptedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptedCredential(..)")
    }
}

/// Plaintext tracker credential produced by a credential resolver.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretToken(String);

impl SecretToken {
    /// Wraps a plaintext credential.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the plaintext value for use in an authentication header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretToken(<redacted>)")
    }
}
