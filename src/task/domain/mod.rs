//! Domain model for tasks created from external tracker issues.
//!
//! Connectors produce [`SourceIssue`] values; the upsert service turns them
//! into [`Task`] aggregates carrying one [`ProviderIssue`] sub-record. All
//! infrastructure concerns stay outside this boundary.

mod error;
mod ids;
mod issue;
mod provider_issue;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{ExternalIssueId, IssueNumber, RepositoryFullName, TaskId};
pub use issue::{IssueKey, IssueMetadata, IssueProvider, SourceIssue};
pub use provider_issue::{
    GitHubIssueRecord, GitLabIssueRecord, IssueFields, JiraIssueRecord, ProviderIssue,
    strip_null_values,
};
pub use task::{PersistedTaskData, Task, TaskStatus, UpsertOutcome};
