//! Idempotent create-or-update of tasks keyed by external issue.

use crate::source::domain::{ProjectId, TaskSourceId};
use crate::task::{
    domain::{IssueKey, SourceIssue, Task, TaskDomainError, UpsertOutcome},
    ports::{TaskRepository, TaskRepositoryError},
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Service-level errors for task upserts.
#[derive(Debug, Error)]
pub enum TaskUpsertError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for task upsert operations.
pub type TaskUpsertResult<T> = Result<T, TaskUpsertError>;

/// A stored task together with what the upsert did to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertedTask {
    /// The task as it now exists in the store.
    pub task: Task,
    /// Whether the task was created, refreshed, or left alone.
    pub outcome: UpsertOutcome,
}

impl UpsertedTask {
    /// Returns whether the upsert inserted a new task.
    #[must_use]
    pub fn was_created(&self) -> bool {
        self.outcome == UpsertOutcome::Created
    }
}

/// Create-or-update seam used by the sync orchestrator.
#[async_trait]
pub trait TaskUpserter: Send + Sync {
    /// Creates a pending task for the issue, or refreshes the existing one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskUpsertError::Domain`] when the issue cannot become a
    /// task and [`TaskUpsertError::Repository`] when the store fails.
    async fn upsert(
        &self,
        task_source_id: TaskSourceId,
        project_id: ProjectId,
        issue: &SourceIssue,
    ) -> TaskUpsertResult<UpsertedTask>;
}

/// Task upsert service backed by a [`TaskRepository`].
#[derive(Clone)]
pub struct TaskUpsertService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskUpsertService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new upsert service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Retrieves the task created from an issue.
    ///
    /// # Errors
    ///
    /// Returns [`TaskUpsertError::Repository`] when the lookup fails.
    pub async fn find_by_issue_key(&self, key: &IssueKey) -> TaskUpsertResult<Option<Task>> {
        Ok(self.repository.find_by_issue_key(key).await?)
    }

    /// Lists the tasks a source has created.
    ///
    /// # Errors
    ///
    /// Returns [`TaskUpsertError::Repository`] when the lookup fails.
    pub async fn list_for_source(&self, source_id: TaskSourceId) -> TaskUpsertResult<Vec<Task>> {
        Ok(self.repository.list_by_source(source_id).await?)
    }
}

#[async_trait]
impl<R, C> TaskUpserter for TaskUpsertService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    async fn upsert(
        &self,
        task_source_id: TaskSourceId,
        project_id: ProjectId,
        issue: &SourceIssue,
    ) -> TaskUpsertResult<UpsertedTask> {
        let candidate = Task::new_from_issue(project_id, task_source_id, issue, &*self.clock)?;
        let (task, outcome) = self.repository.upsert(&candidate).await?;
        debug!(
            issue_key = %task.issue_key(),
            task_id = %task.id(),
            ?outcome,
            "upserted task from issue"
        );
        Ok(UpsertedTask { task, outcome })
    }
}
