//! Error types for task source validation and parsing.

use thiserror::Error;

/// Errors returned while constructing task source domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceDomainError {
    /// The source name is empty after trimming.
    #[error("task source name must not be empty")]
    EmptySourceName,

    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// A host value could not be used as a tracker base URL.
    #[error("invalid tracker host '{0}'")]
    InvalidHost(String),

    /// The GitLab project path is not `namespace/project`.
    #[error("invalid GitLab project path '{0}', expected namespace/project")]
    InvalidProjectPath(String),

    /// The Jira project key is empty or contains whitespace.
    #[error("invalid Jira project key '{0}'")]
    InvalidProjectKey(String),

    /// The Jira account email is empty.
    #[error("Jira account email must not be empty")]
    EmptyAccountEmail,

    /// The encrypted credential blob is empty.
    #[error("credential reference must not be empty")]
    EmptyCredential,
}

/// Error returned while parsing source kinds from persistence or messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task source kind: {0}")]
pub struct ParseSourceKindError(pub String);

/// Error returned while parsing sync statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown sync status: {0}")]
pub struct ParseSyncStatusError(pub String);
