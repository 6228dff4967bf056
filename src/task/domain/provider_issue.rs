//! Provider-specific issue sub-records stored on tasks.
//!
//! A task carries exactly one sub-record. The sum type makes the three-way
//! provider choice exhaustive; persistence splits it back into one JSON
//! column per provider.

use super::{
    ExternalIssueId, IssueKey, IssueMetadata, IssueNumber, IssueProvider, RepositoryFullName,
    SourceIssue, TaskDomainError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Issue fields shared by every provider sub-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFields {
    /// Provider's issue identifier.
    pub id: ExternalIssueId,
    /// Per-project issue number.
    #[serde(default)]
    pub iid: Option<IssueNumber>,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed description; blank descriptions are absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Tracker's last-modified timestamp.
    pub updated_at: DateTime<Utc>,
    /// Issue labels.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Browser URL of the issue.
    #[serde(default)]
    pub web_url: Option<String>,
}

impl IssueFields {
    fn from_issue(issue: &SourceIssue) -> Result<Self, TaskDomainError> {
        let title = issue.title().trim();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyIssueTitle);
        }
        let description = issue
            .description()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned);

        Ok(Self {
            id: issue.id().clone(),
            iid: issue.iid(),
            title: title.to_owned(),
            description,
            updated_at: issue.updated_at(),
            labels: issue.labels().to_vec(),
            web_url: issue.metadata().web_url().map(ToOwned::to_owned),
        })
    }
}

/// Sub-record for a GitLab issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabIssueRecord {
    /// Shared issue fields.
    #[serde(flatten)]
    pub fields: IssueFields,
    /// Base URL of the GitLab instance.
    pub host: String,
    /// `namespace/project` path.
    pub project_path: String,
}

/// Sub-record for a GitHub issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubIssueRecord {
    /// Shared issue fields.
    #[serde(flatten)]
    pub fields: IssueFields,
    /// Repository in `owner/repo` form.
    pub repository: RepositoryFullName,
}

/// Sub-record for a Jira ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraIssueRecord {
    /// Shared issue fields.
    #[serde(flatten)]
    pub fields: IssueFields,
    /// Base URL of the Jira site.
    pub host: String,
    /// Jira project key.
    pub project_key: String,
    /// Human-facing ticket key.
    pub issue_key: String,
}

/// The provider sub-record attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum ProviderIssue {
    /// GitLab issue sub-record.
    #[serde(rename = "gitlab")]
    GitLab(GitLabIssueRecord),
    /// GitHub issue sub-record.
    #[serde(rename = "github")]
    GitHub(GitHubIssueRecord),
    /// Jira ticket sub-record.
    #[serde(rename = "jira")]
    Jira(JiraIssueRecord),
}

impl ProviderIssue {
    /// Builds the sub-record matching the issue's provider.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyIssueTitle`] when the title is blank.
    pub fn from_issue(issue: &SourceIssue) -> Result<Self, TaskDomainError> {
        let fields = IssueFields::from_issue(issue)?;
        let record = match issue.metadata().clone() {
            IssueMetadata::GitLab {
                host, project_path, ..
            } => Self::GitLab(GitLabIssueRecord {
                fields,
                host,
                project_path,
            }),
            IssueMetadata::GitHub { repository, .. } => {
                Self::GitHub(GitHubIssueRecord { fields, repository })
            }
            IssueMetadata::Jira {
                host,
                project_key,
                issue_key,
                ..
            } => Self::Jira(JiraIssueRecord {
                fields,
                host,
                project_key,
                issue_key,
            }),
        };
        Ok(record)
    }

    /// Returns the provider of this sub-record.
    #[must_use]
    pub const fn provider(&self) -> IssueProvider {
        match self {
            Self::GitLab(_) => IssueProvider::GitLab,
            Self::GitHub(_) => IssueProvider::GitHub,
            Self::Jira(_) => IssueProvider::Jira,
        }
    }

    /// Returns the fields shared by all providers.
    #[must_use]
    pub const fn fields(&self) -> &IssueFields {
        match self {
            Self::GitLab(record) => &record.fields,
            Self::GitHub(record) => &record.fields,
            Self::Jira(record) => &record.fields,
        }
    }

    /// Returns the natural key of the underlying issue.
    #[must_use]
    pub fn issue_key(&self) -> IssueKey {
        IssueKey::new(self.provider(), self.fields().id.clone())
    }

    /// Serializes the record body without its provider tag and without null
    /// members, ready for the provider's JSON column.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a field cannot be encoded.
    pub fn to_compact_json(&self) -> Result<Value, serde_json::Error> {
        let value = match self {
            Self::GitLab(record) => serde_json::to_value(record)?,
            Self::GitHub(record) => serde_json::to_value(record)?,
            Self::Jira(record) => serde_json::to_value(record)?,
        };
        Ok(strip_null_values(value))
    }

    /// Rebuilds a sub-record from its provider's JSON column.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error when the payload does not match the
    /// provider's record shape.
    pub fn from_compact_json(
        provider: IssueProvider,
        value: Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match provider {
            IssueProvider::GitLab => Self::GitLab(serde_json::from_value(value)?),
            IssueProvider::GitHub => Self::GitHub(serde_json::from_value(value)?),
            IssueProvider::Jira => Self::Jira(serde_json::from_value(value)?),
        })
    }
}

/// Removes null members from JSON objects, recursing into arrays and objects.
#[must_use]
pub fn strip_null_values(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, member)| !member.is_null())
                .map(|(name, member)| (name, strip_null_values(member)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_null_values).collect()),
        other => other,
    }
}
