//! Per-source record of issue versions already turned into tasks.

use crate::task::domain::{ExternalIssueId, SourceIssue};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Last successfully processed version of one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStateEntry {
    issue_id: ExternalIssueId,
    issue_updated_at: DateTime<Utc>,
}

impl SyncStateEntry {
    /// Creates an entry.
    #[must_use]
    pub const fn new(issue_id: ExternalIssueId, issue_updated_at: DateTime<Utc>) -> Self {
        Self {
            issue_id,
            issue_updated_at,
        }
    }

    /// Records the version of a successfully processed issue.
    #[must_use]
    pub fn for_issue(issue: &SourceIssue) -> Self {
        Self::new(issue.id().clone(), issue.updated_at())
    }

    /// Returns the provider's issue identifier.
    #[must_use]
    pub const fn issue_id(&self) -> &ExternalIssueId {
        &self.issue_id
    }

    /// Returns the processed version timestamp.
    #[must_use]
    pub const fn issue_updated_at(&self) -> DateTime<Utc> {
        self.issue_updated_at
    }
}

/// How a fetched issue relates to the recorded sync state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueChange {
    /// No version has been processed for this issue.
    New,
    /// The recorded version differs from the fetched one.
    Updated,
    /// The fetched version has already been processed.
    Unchanged,
}

impl IssueChange {
    /// Returns whether the issue needs to be upserted.
    #[must_use]
    pub const fn needs_upsert(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Recorded versions for one source, keyed by issue id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStateSnapshot {
    versions: HashMap<ExternalIssueId, DateTime<Utc>>,
}

impl SyncStateSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from stored entries. Later entries win.
    pub fn from_entries(entries: impl IntoIterator<Item = SyncStateEntry>) -> Self {
        Self {
            versions: entries
                .into_iter()
                .map(|entry| (entry.issue_id, entry.issue_updated_at))
                .collect(),
        }
    }

    /// Classifies a fetched issue against the recorded version.
    ///
    /// Any difference counts as an update, including a fetched version older
    /// than the recorded one.
    #[must_use]
    pub fn classify(&self, issue: &SourceIssue) -> IssueChange {
        match self.versions.get(issue.id()) {
            None => IssueChange::New,
            Some(recorded) if *recorded == issue.updated_at() => IssueChange::Unchanged,
            Some(_) => IssueChange::Updated,
        }
    }

    /// Returns the recorded version of an issue.
    #[must_use]
    pub fn version_of(&self, issue_id: &ExternalIssueId) -> Option<DateTime<Utc>> {
        self.versions.get(issue_id).copied()
    }

    /// Returns the number of recorded issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Returns whether no issue has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
