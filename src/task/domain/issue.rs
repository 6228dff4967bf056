//! Normalized external issue projection produced by connectors.

use super::{ExternalIssueId, IssueNumber, RepositoryFullName, TaskDomainError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported external issue providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueProvider {
    /// GitLab issues.
    #[serde(rename = "gitlab")]
    GitLab,
    /// GitHub issues.
    #[serde(rename = "github")]
    GitHub,
    /// Jira tickets.
    #[serde(rename = "jira")]
    Jira,
}

impl IssueProvider {
    /// Returns provider name in canonical storage format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GitLab => "gitlab",
            Self::GitHub => "github",
            Self::Jira => "jira",
        }
    }
}

impl TryFrom<&str> for IssueProvider {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "gitlab" => Ok(Self::GitLab),
            "github" => Ok(Self::GitHub),
            "jira" => Ok(Self::Jira),
            _ => Err(TaskDomainError::InvalidIssueProvider(value.to_owned())),
        }
    }
}

impl fmt::Display for IssueProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Natural key of an external issue: provider plus the provider's issue id.
///
/// The same key identifies the task created for the issue and the work lock
/// claimed while processing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueKey {
    provider: IssueProvider,
    external_id: ExternalIssueId,
}

impl IssueKey {
    /// Creates an issue key from validated components.
    #[must_use]
    pub const fn new(provider: IssueProvider, external_id: ExternalIssueId) -> Self {
        Self {
            provider,
            external_id,
        }
    }

    /// Creates an issue key from raw values.
    ///
    /// # Errors
    ///
    /// Returns a [`TaskDomainError`] when the provider or id is invalid.
    pub fn from_parts(provider: &str, external_id: &str) -> Result<Self, TaskDomainError> {
        Ok(Self::new(
            IssueProvider::try_from(provider)?,
            ExternalIssueId::new(external_id)?,
        ))
    }

    /// Returns the issue provider.
    #[must_use]
    pub const fn provider(&self) -> IssueProvider {
        self.provider
    }

    /// Returns the provider's issue identifier.
    #[must_use]
    pub const fn external_id(&self) -> &ExternalIssueId {
        &self.external_id
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.external_id)
    }
}

/// Provider-specific location of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum IssueMetadata {
    /// Issue in a GitLab project.
    #[serde(rename = "gitlab")]
    GitLab {
        /// Base URL of the GitLab instance.
        host: String,
        /// `namespace/project` path.
        project_path: String,
        /// Browser URL of the issue.
        web_url: Option<String>,
    },
    /// Issue in a GitHub repository.
    #[serde(rename = "github")]
    GitHub {
        /// Repository in `owner/repo` form.
        repository: RepositoryFullName,
        /// Browser URL of the issue.
        web_url: Option<String>,
    },
    /// Ticket in a Jira project.
    #[serde(rename = "jira")]
    Jira {
        /// Base URL of the Jira site.
        host: String,
        /// Jira project key.
        project_key: String,
        /// Human-facing ticket key such as `OPS-12`.
        issue_key: String,
        /// Browser URL of the ticket.
        web_url: Option<String>,
    },
}

impl IssueMetadata {
    /// Returns the provider this metadata belongs to.
    #[must_use]
    pub const fn provider(&self) -> IssueProvider {
        match self {
            Self::GitLab { .. } => IssueProvider::GitLab,
            Self::GitHub { .. } => IssueProvider::GitHub,
            Self::Jira { .. } => IssueProvider::Jira,
        }
    }

    /// Returns the browser URL, if the tracker supplied one.
    #[must_use]
    pub fn web_url(&self) -> Option<&str> {
        match self {
            Self::GitLab { web_url, .. } | Self::GitHub { web_url, .. } | Self::Jira { web_url, .. } => {
                web_url.as_deref()
            }
        }
    }
}

/// One external issue as fetched from a tracker.
///
/// Titles are not validated here; an empty title is reported when the issue
/// is turned into a task so that one bad issue cannot stop a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIssue {
    id: ExternalIssueId,
    iid: Option<IssueNumber>,
    title: String,
    description: Option<String>,
    updated_at: DateTime<Utc>,
    labels: Vec<String>,
    metadata: IssueMetadata,
}

impl SourceIssue {
    /// Creates an issue with the required fields.
    #[must_use]
    pub fn new(
        id: ExternalIssueId,
        title: impl Into<String>,
        updated_at: DateTime<Utc>,
        metadata: IssueMetadata,
    ) -> Self {
        Self {
            id,
            iid: None,
            title: title.into(),
            description: None,
            updated_at,
            labels: Vec::new(),
            metadata,
        }
    }

    /// Sets the per-project issue number.
    #[must_use]
    pub const fn with_iid(mut self, iid: IssueNumber) -> Self {
        self.iid = Some(iid);
        self
    }

    /// Sets the issue description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Sets the issue labels.
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = labels
            .into_iter()
            .map(|label| label.trim().to_owned())
            .filter(|label| !label.is_empty())
            .collect();
        self
    }

    /// Returns the provider's issue identifier.
    #[must_use]
    pub const fn id(&self) -> &ExternalIssueId {
        &self.id
    }

    /// Returns the per-project issue number, if the provider has one.
    #[must_use]
    pub const fn iid(&self) -> Option<IssueNumber> {
        self.iid
    }

    /// Returns the raw title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the raw description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the tracker's last-modified timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the issue labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the provider-specific metadata.
    #[must_use]
    pub const fn metadata(&self) -> &IssueMetadata {
        &self.metadata
    }

    /// Returns the issue provider.
    #[must_use]
    pub const fn provider(&self) -> IssueProvider {
        self.metadata.provider()
    }

    /// Returns the natural key used for upserts and work locks.
    #[must_use]
    pub fn issue_key(&self) -> IssueKey {
        IssueKey::new(self.provider(), self.id.clone())
    }
}
