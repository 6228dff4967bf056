//! Port for the per-source record of processed issue versions.

use crate::source::domain::TaskSourceId;
use crate::sync::domain::{SyncStateEntry, SyncStateSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for sync state operations.
pub type SyncStateResult<T> = Result<T, SyncStateError>;

/// Storage of `(source, issue) -> processed version` entries.
///
/// Concurrent reads must not contend. Writes for one source are issued by
/// one run at a time.
#[async_trait]
pub trait SyncStateStore: Send + Sync {
    /// Loads every recorded version for a source.
    ///
    /// # Errors
    ///
    /// Returns [`SyncStateError::Persistence`] when the store fails.
    async fn get(&self, source_id: TaskSourceId) -> SyncStateResult<SyncStateSnapshot>;

    /// Inserts or overwrites a batch of entries as one atomic write.
    ///
    /// An empty batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SyncStateError::Persistence`] when the store fails; no entry
    /// of the batch is written in that case.
    async fn upsert_batch(
        &self,
        source_id: TaskSourceId,
        entries: &[SyncStateEntry],
    ) -> SyncStateResult<()>;
}

/// Errors returned by sync state stores.
#[derive(Debug, Clone, Error)]
pub enum SyncStateError {
    /// Persistence-layer failure.
    #[error("sync state persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SyncStateError {
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
