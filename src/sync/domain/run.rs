//! Sync run requests and their structured results.

use crate::source::domain::{SourceKind, SyncStatus, TaskSourceId};
use crate::task::domain::ExternalIssueId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Queue message asking for one source to be synced.
///
/// Serialized as `{ "taskSourceId": "<uuid>", "provider": "gitlab_issues" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Source to sync.
    pub task_source_id: TaskSourceId,
    /// Provider the caller expects the source to use.
    pub provider: SourceKind,
}

impl SyncRequest {
    /// Creates a request.
    #[must_use]
    pub const fn new(task_source_id: TaskSourceId, provider: SourceKind) -> Self {
        Self {
            task_source_id,
            provider,
        }
    }
}

/// Stage of a run that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorKind {
    /// The source or project could not be used.
    Precondition,
    /// The tracker could not be read.
    Fetch,
    /// One issue could not be processed.
    Issue,
    /// Sync state or source status could not be read or written.
    State,
}

impl SyncErrorKind {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Precondition => "precondition",
            Self::Fetch => "fetch",
            Self::Issue => "issue",
            Self::State => "state",
        }
    }
}

impl fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One error recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRunError {
    kind: SyncErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    issue_id: Option<ExternalIssueId>,
    message: String,
}

impl SyncRunError {
    /// The source or its project failed a precondition.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::general(SyncErrorKind::Precondition, message)
    }

    /// The tracker could not be read.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::general(SyncErrorKind::Fetch, message)
    }

    /// Sync state or source status persistence failed.
    pub fn state(message: impl Into<String>) -> Self {
        Self::general(SyncErrorKind::State, message)
    }

    /// Processing of a single issue failed.
    pub fn issue(issue_id: ExternalIssueId, message: impl Into<String>) -> Self {
        Self {
            kind: SyncErrorKind::Issue,
            issue_id: Some(issue_id),
            message: message.into(),
        }
    }

    /// An issue could not be mapped from the tracker payload.
    ///
    /// The id is kept only when it is a valid issue id.
    pub fn unmapped_issue(issue_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind: SyncErrorKind::Issue,
            issue_id: ExternalIssueId::new(issue_id).ok(),
            message: message.into(),
        }
    }

    fn general(kind: SyncErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            issue_id: None,
            message: message.into(),
        }
    }

    /// Returns the stage that failed.
    #[must_use]
    pub const fn kind(&self) -> SyncErrorKind {
        self.kind
    }

    /// Returns the issue the error refers to, if any.
    #[must_use]
    pub const fn issue_id(&self) -> Option<&ExternalIssueId> {
        self.issue_id.as_ref()
    }

    /// Returns the error detail.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SyncRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue_id {
            Some(issue_id) => write!(f, "{} error for issue {issue_id}: {}", self.kind, self.message),
            None => write!(f, "{} error: {}", self.kind, self.message),
        }
    }
}

/// Outcome of one sync run. Callers always receive one, even on abort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRunResult {
    /// Source the run was for.
    pub task_source_id: TaskSourceId,
    /// Terminal status the run ended in.
    pub status: SyncStatus,
    /// Tasks created for previously unseen issues.
    pub tasks_created: usize,
    /// Existing tasks refreshed from changed issues.
    pub tasks_updated: usize,
    /// Issues upserted without any change to the stored task.
    pub tasks_unchanged: usize,
    /// Issues skipped because their version was already processed or
    /// another run held their lock.
    pub issues_skipped: usize,
    /// Errors in the order they occurred.
    pub errors: Vec<SyncRunError>,
}

impl SyncRunResult {
    /// Creates an empty result for a run that has not finished.
    #[must_use]
    pub const fn new(task_source_id: TaskSourceId) -> Self {
        Self {
            task_source_id,
            status: SyncStatus::Syncing,
            tasks_created: 0,
            tasks_updated: 0,
            tasks_unchanged: 0,
            issues_skipped: 0,
            errors: Vec::new(),
        }
    }

    /// Returns whether the run reached `completed`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SyncStatus::Completed
    }

    /// Returns the errors of one kind.
    pub fn errors_of(&self, kind: SyncErrorKind) -> impl Iterator<Item = &SyncRunError> {
        self.errors.iter().filter(move |error| error.kind() == kind)
    }
}
