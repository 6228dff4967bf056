//! Task aggregate root and its workflow status.

use super::{IssueKey, ParseTaskStatusError, ProviderIssue, SourceIssue, TaskDomainError, TaskId};
use crate::source::domain::{ProjectId, TaskSourceId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status of a task.
///
/// Sync only ever sets [`TaskStatus::Pending`] on creation; every later
/// transition belongs to the evaluation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created from an issue, not yet evaluated.
    Pending,
    /// Under automated evaluation.
    Evaluating,
    /// Evaluated and ready for implementation.
    Ready,
    /// Being implemented.
    InProgress,
    /// Finished.
    Completed,
    /// Implementation failed.
    Failed,
    /// Abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Evaluating => "evaluating",
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "evaluating" => Ok(Self::Evaluating),
            "ready" => Ok(Self::Ready),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an upsert did to the task store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// No task existed for the issue; one was inserted.
    Created,
    /// The existing task was refreshed from a newer snapshot.
    Updated,
    /// The existing task already reflected the snapshot; nothing was written.
    Unchanged,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    task_source_id: TaskSourceId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    source_issue: ProviderIssue,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Source that created the task.
    pub task_source_id: TaskSourceId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted workflow status.
    pub status: TaskStatus,
    /// Persisted provider sub-record.
    pub source_issue: ProviderIssue,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task from a fetched issue.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyIssueTitle`] when the issue title is
    /// blank.
    pub fn new_from_issue(
        project_id: ProjectId,
        task_source_id: TaskSourceId,
        issue: &SourceIssue,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let source_issue = ProviderIssue::from_issue(issue)?;
        let timestamp = clock.utc();
        let fields = source_issue.fields();

        Ok(Self {
            id: TaskId::new(),
            project_id,
            task_source_id,
            title: fields.title.clone(),
            description: fields.description.clone(),
            status: TaskStatus::Pending,
            source_issue,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            task_source_id: data.task_source_id,
            title: data.title,
            description: data.description,
            status: data.status,
            source_issue: data.source_issue,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the source that created the task.
    #[must_use]
    pub const fn task_source_id(&self) -> TaskSourceId {
        self.task_source_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the provider sub-record.
    #[must_use]
    pub const fn source_issue(&self) -> &ProviderIssue {
        &self.source_issue
    }

    /// Returns the natural key of the originating issue.
    #[must_use]
    pub fn issue_key(&self) -> IssueKey {
        self.source_issue.issue_key()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a newer issue snapshot, leaving the workflow status alone.
    ///
    /// Returns `false` without touching the task when the sub-record already
    /// equals the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::IssueKeyMismatch`] when the snapshot belongs
    /// to a different external issue.
    pub fn apply_issue_snapshot(
        &mut self,
        snapshot: &ProviderIssue,
        modified_at: DateTime<Utc>,
    ) -> Result<bool, TaskDomainError> {
        let expected = self.issue_key();
        let actual = snapshot.issue_key();
        if expected != actual {
            return Err(TaskDomainError::IssueKeyMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        if self.source_issue == *snapshot {
            return Ok(false);
        }

        let fields = snapshot.fields();
        self.title.clone_from(&fields.title);
        self.description.clone_from(&fields.description);
        self.source_issue = snapshot.clone();
        self.updated_at = modified_at;
        Ok(true)
    }

    /// Refreshes the task from a fetched issue at the clock's time.
    ///
    /// # Errors
    ///
    /// Returns a [`TaskDomainError`] when the issue title is blank or the
    /// issue belongs to a different task.
    pub fn refresh_from_issue(
        &mut self,
        issue: &SourceIssue,
        clock: &impl Clock,
    ) -> Result<bool, TaskDomainError> {
        let snapshot = ProviderIssue::from_issue(issue)?;
        self.apply_issue_snapshot(&snapshot, clock.utc())
    }
}
