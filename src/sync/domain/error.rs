//! Error types for sync domain validation.

use thiserror::Error;

/// Validation failures for sync domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncDomainError {
    /// A lock key was blank.
    #[error("lock key must not be empty")]
    EmptyLockKey,

    /// A holder identifier was blank.
    #[error("lock holder id must not be empty")]
    EmptyHolderId,
}
