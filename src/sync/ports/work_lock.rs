//! Port for leased per-issue work claims.

use crate::sync::domain::{HolderId, LockKey};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for work lock operations.
pub type WorkLockResult<T> = Result<T, WorkLockError>;

/// Mutual exclusion on a key with a lease that expires on its own.
///
/// At most one live lease exists per key. Implementations must perform the
/// acquire check and the write as a single atomic step.
#[async_trait]
pub trait WorkLock: Send + Sync {
    /// Claims `key` when it is free or its lease has expired.
    ///
    /// Returns `false` when another live lease exists, including one held by
    /// the same holder.
    ///
    /// # Errors
    ///
    /// Returns [`WorkLockError::Persistence`] when the store fails.
    async fn try_acquire(
        &self,
        key: &LockKey,
        holder: &HolderId,
        lease: Duration,
    ) -> WorkLockResult<bool>;

    /// Removes the lock when `holder` owns it. Returns whether a lock was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkLockError::Persistence`] when the store fails.
    async fn release(&self, key: &LockKey, holder: &HolderId) -> WorkLockResult<bool>;

    /// Returns whether a live lease exists. Intended for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`WorkLockError::Persistence`] when the store fails.
    async fn is_locked(&self, key: &LockKey) -> WorkLockResult<bool>;

    /// Extends a live lease owned by `holder` to `lease` from now.
    ///
    /// Returns `false` when the holder no longer owns a live lease.
    ///
    /// # Errors
    ///
    /// Returns [`WorkLockError::Persistence`] when the store fails.
    async fn renew(
        &self,
        key: &LockKey,
        holder: &HolderId,
        lease: Duration,
    ) -> WorkLockResult<bool>;
}

/// Errors returned by work lock implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkLockError {
    /// Persistence-layer failure.
    #[error("work lock persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkLockError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps an already boxed persistence error.
    #[must_use]
    pub fn persistence_boxed(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Persistence(Arc::from(err))
    }
}
