//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The issue provider value is unsupported.
    #[error("unsupported issue provider: {0}")]
    InvalidIssueProvider(String),

    /// The repository name does not follow `owner/repo` format.
    #[error("invalid repository name '{0}', expected owner/repo")]
    InvalidRepository(String),

    /// The issue number is invalid.
    #[error("invalid issue number {0}, expected a positive integer")]
    InvalidIssueNumber(u64),

    /// The external issue identifier is empty after trimming.
    #[error("external issue identifier must not be empty")]
    EmptyExternalId,

    /// The issue title is empty after trimming.
    #[error("issue title must not be empty")]
    EmptyIssueTitle,

    /// A snapshot for a different external issue was applied to a task.
    #[error("issue snapshot {actual} does not belong to task issue {expected}")]
    IssueKeyMismatch {
        /// Issue key the task was created from.
        expected: String,
        /// Issue key carried by the rejected snapshot.
        actual: String,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
