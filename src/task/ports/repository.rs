//! Repository port for task persistence and issue-keyed lookup.

use crate::source::domain::TaskSourceId;
use crate::task::domain::{IssueKey, Task, TaskId, UpsertOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts `candidate`, or refreshes the task already stored for the same
    /// issue key, as one atomic step.
    ///
    /// When a task exists its identifier, status, owner, and creation time are
    /// kept; only the title, description, sub-record, and modification time are
    /// taken from `candidate`. The stored task is returned with the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the store fails.
    async fn upsert(&self, candidate: &Task) -> TaskRepositoryResult<(Task, UpsertOutcome)>;

    /// Finds a task by internal task identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Finds the task created from the given issue.
    ///
    /// Returns `None` when no task exists for the issue key.
    async fn find_by_issue_key(&self, key: &IssueKey) -> TaskRepositoryResult<Option<Task>>;

    /// Lists tasks created by a task source, oldest first.
    async fn list_by_source(&self, source_id: TaskSourceId) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
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
