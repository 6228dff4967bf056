//! Credential resolvers that do not depend on the encryption service.

use std::collections::HashMap;

use crate::source::{
    domain::{EncryptedCredential, SecretToken},
    ports::{CredentialError, CredentialResolver},
};

/// Resolver backed by a fixed blob-to-secret table.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialResolver {
    secrets: HashMap<String, String>,
}

impl StaticCredentialResolver {
    /// Creates an empty resolver; every lookup fails until entries are added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the plaintext for a stored blob.
    #[must_use]
    pub fn with_secret(mut self, blob: impl Into<String>, secret: impl Into<String>) -> Self {
        self.secrets.insert(blob.into(), secret.into());
        self
    }
}

impl CredentialResolver for StaticCredentialResolver {
    fn decrypt(&self, credential: &EncryptedCredential) -> Result<SecretToken, CredentialError> {
        self.secrets
            .get(credential.as_str())
            .map(SecretToken::new)
            .ok_or(CredentialError::Unknown)
    }
}

/// Resolver treating stored blobs as plaintext.
///
/// Only suitable for local development against throwaway tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextCredentialResolver;

impl CredentialResolver for PlaintextCredentialResolver {
    fn decrypt(&self, credential: &EncryptedCredential) -> Result<SecretToken, CredentialError> {
        Ok(SecretToken::new(credential.as_str()))
    }
}
