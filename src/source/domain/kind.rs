//! Tracker kinds a task source can connect to.

use super::ParseSourceKindError;
use crate::task::domain::IssueProvider;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of external tracker a task source reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// GitLab project issues.
    GitlabIssues,
    /// GitHub repository issues.
    GithubIssues,
    /// Jira project tickets.
    Jira,
}

impl SourceKind {
    /// Every supported source kind.
    pub const ALL: [Self; 3] = [Self::GitlabIssues, Self::GithubIssues, Self::Jira];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GitlabIssues => "gitlab_issues",
            Self::GithubIssues => "github_issues",
            Self::Jira => "jira",
        }
    }

    /// Returns the issue provider whose sub-record tasks from this kind carry.
    #[must_use]
    pub const fn provider(self) -> IssueProvider {
        match self {
            Self::GitlabIssues => IssueProvider::GitLab,
            Self::GithubIssues => IssueProvider::GitHub,
            Self::Jira => IssueProvider::Jira,
        }
    }
}

impl TryFrom<&str> for SourceKind {
    type Error = ParseSourceKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "gitlab_issues" => Ok(Self::GitlabIssues),
            "github_issues" => Ok(Self::GithubIssues),
            "jira" => Ok(Self::Jira),
            _ => Err(ParseSourceKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
