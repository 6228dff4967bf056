//! In-memory task repository for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::source::domain::TaskSourceId;
use crate::task::{
    domain::{IssueKey, Task, TaskId, UpsertOutcome},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// The issue-key index and the task table are updated under one write guard,
/// so concurrent upserts for the same issue serialize.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    issue_index: HashMap<IssueKey, TaskId>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the lock is poisoned.
    pub fn len(&self) -> TaskRepositoryResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.len())
    }

    /// Returns whether the repository holds no tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the lock is poisoned.
    pub fn is_empty(&self) -> TaskRepositoryResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn upsert(&self, candidate: &Task) -> TaskRepositoryResult<(Task, UpsertOutcome)> {
        let mut guard = self.state.write().map_err(poisoned)?;
        let state = &mut *guard;
        let key = candidate.issue_key();

        let existing_id = state.issue_index.get(&key).copied();
        let Some(existing) = existing_id.and_then(|id| state.tasks.get_mut(&id)) else {
            state.issue_index.insert(key, candidate.id());
            state.tasks.insert(candidate.id(), candidate.clone());
            return Ok((candidate.clone(), UpsertOutcome::Created));
        };

        let changed = existing
            .apply_issue_snapshot(candidate.source_issue(), candidate.updated_at())
            .map_err(TaskRepositoryError::persistence)?;
        let outcome = if changed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Unchanged
        };
        Ok((existing.clone(), outcome))
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_issue_key(&self, key: &IssueKey) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        let task = state
            .issue_index
            .get(key)
            .and_then(|task_id| state.tasks.get(task_id))
            .cloned();
        Ok(task)
    }

    async fn list_by_source(&self, source_id: TaskSourceId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.task_source_id() == source_id)
            .cloned()
            .collect();
        tasks.sort_by_key(Task::created_at);
        Ok(tasks)
    }
}
