//! Provider-specific task source configuration.

use super::{EncryptedCredential, SourceDomainError, SourceKind};
use crate::task::domain::RepositoryFullName;
use serde::{Deserialize, Serialize};

/// Default GitLab host used when a source does not name one.
pub(crate) const DEFAULT_GITLAB_HOST: &str = "https://gitlab.com";

/// Default GitHub REST API base.
pub(crate) const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

/// Tracker connection settings, tagged by source kind.
///
/// The source kind is derived from the variant, so a source's kind and its
/// configuration cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SourceConfig {
    /// GitLab project issues.
    #[serde(rename = "gitlab_issues")]
    GitLab(GitLabSourceConfig),
    /// GitHub repository issues.
    #[serde(rename = "github_issues")]
    GitHub(GitHubSourceConfig),
    /// Jira project tickets.
    #[serde(rename = "jira")]
    Jira(JiraSourceConfig),
}

impl SourceConfig {
    /// Returns the source kind for this configuration.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::GitLab(_) => SourceKind::GitlabIssues,
            Self::GitHub(_) => SourceKind::GithubIssues,
            Self::Jira(_) => SourceKind::Jira,
        }
    }

    /// Returns the encrypted credential reference.
    #[must_use]
    pub const fn credential(&self) -> &EncryptedCredential {
        match self {
            Self::GitLab(config) => &config.credential,
            Self::GitHub(config) => &config.credential,
            Self::Jira(config) => &config.credential,
        }
    }
}

/// Connection settings for a GitLab project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabSourceConfig {
    host: String,
    project_path: String,
    #[serde(default)]
    labels: Vec<String>,
    credential: EncryptedCredential,
}

impl GitLabSourceConfig {
    /// Creates GitLab settings for a `namespace/project` path on `gitlab.com`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceDomainError::InvalidProjectPath`] when the path has no
    /// namespace segment.
    pub fn new(
        project_path: impl Into<String>,
        credential: EncryptedCredential,
    ) -> Result<Self, SourceDomainError> {
        let raw = project_path.into();
        let normalized = raw.trim().trim_matches('/');
        let segments_valid = normalized.split('/').all(|segment| !segment.is_empty());
        if !normalized.contains('/')
            || !segments_valid
            || normalized.chars().any(char::is_whitespace)
        {
            return Err(SourceDomainError::InvalidProjectPath(raw));
        }
        Ok(Self {
            host: DEFAULT_GITLAB_HOST.to_owned(),
            project_path: normalized.to_owned(),
            labels: Vec::new(),
            credential,
        })
    }

    /// Points the source at a self-hosted GitLab instance.
    ///
    /// # Errors
    ///
    /// Returns [`SourceDomainError::InvalidHost`] when the host is empty or
    /// contains whitespace.
    pub fn with_host(mut self, host: impl Into<String>) -> Result<Self, SourceDomainError> {
        self.host = normalize_host(host.into())?;
        Ok(self)
    }

    /// Restricts the sync to issues carrying all given labels.
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = normalize_labels(labels);
        self
    }

    /// Returns the base URL of the GitLab instance.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the `namespace/project` path.
    #[must_use]
    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    /// Returns the label filter.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the encrypted credential reference.
    #[must_use]
    pub const fn credential(&self) -> &EncryptedCredential {
        &self.credential
    }
}

/// Connection settings for a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubSourceConfig {
    repository: RepositoryFullName,
    api_base: String,
    #[serde(default)]
    labels: Vec<String>,
    credential: EncryptedCredential,
}

impl GitHubSourceConfig {
    /// Creates GitHub settings for a repository on `github.com`.
    #[must_use]
    pub fn new(repository: RepositoryFullName, credential: EncryptedCredential) -> Self {
        Self {
            repository,
            api_base: DEFAULT_GITHUB_API_BASE.to_owned(),
            labels: Vec::new(),
            credential,
        }
    }

    /// Points the source at a GitHub Enterprise API base.
    ///
    /// # Errors
    ///
    /// Returns [`SourceDomainError::InvalidHost`] when the base URL is empty
    /// or contains whitespace.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Result<Self, SourceDomainError> {
        self.api_base = normalize_host(api_base.into())?;
        Ok(self)
    }

    /// Restricts the sync to issues carrying all given labels.
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = normalize_labels(labels);
        self
    }

    /// Returns the repository in `owner/repo` form.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryFullName {
        &self.repository
    }

    /// Returns the REST API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the label filter.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the encrypted credential reference.
    #[must_use]
    pub const fn credential(&self) -> &EncryptedCredential {
        &self.credential
    }
}

/// Connection settings for a Jira project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraSourceConfig {
    host: String,
    project_key: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jql: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
    credential: EncryptedCredential,
}

impl JiraSourceConfig {
    /// Creates Jira settings for a project on the given site.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceDomainError`] when the host, project key, or account
    /// email is invalid.
    pub fn new(
        host: impl Into<String>,
        project_key: impl Into<String>,
        email: impl Into<String>,
        credential: EncryptedCredential,
    ) -> Result<Self, SourceDomainError> {
        let raw_key = project_key.into();
        let key = raw_key.trim();
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(SourceDomainError::InvalidProjectKey(raw_key));
        }
        let raw_email = email.into();
        let trimmed_email = raw_email.trim();
        if trimmed_email.is_empty() {
            return Err(SourceDomainError::EmptyAccountEmail);
        }
        Ok(Self {
            host: normalize_host(host.into())?,
            project_key: key.to_ascii_uppercase(),
            email: trimmed_email.to_owned(),
            jql: None,
            labels: Vec::new(),
            credential,
        })
    }

    /// Replaces the default project query with a custom JQL filter.
    #[must_use]
    pub fn with_jql(mut self, jql: impl Into<String>) -> Self {
        let value = jql.into();
        let normalized = value.trim();
        self.jql = (!normalized.is_empty()).then(|| normalized.to_owned());
        self
    }

    /// Restricts the sync to tickets carrying all given labels.
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = normalize_labels(labels);
        self
    }

    /// Returns the Jira site base URL.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the upper-cased project key.
    #[must_use]
    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    /// Returns the account email used for basic authentication.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the custom JQL filter, if any.
    #[must_use]
    pub fn jql(&self) -> Option<&str> {
        self.jql.as_deref()
    }

    /// Returns the label filter.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the encrypted credential reference.
    #[must_use]
    pub const fn credential(&self) -> &EncryptedCredential {
        &self.credential
    }
}

/// Normalizes a host into a scheme-qualified base URL without a trailing slash.
fn normalize_host(raw: String) -> Result<String, SourceDomainError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(SourceDomainError::InvalidHost(raw));
    }
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        Ok(trimmed.to_owned())
    } else {
        Ok(format!("https://{trimmed}"))
    }
}

fn normalize_labels(labels: impl IntoIterator<Item = String>) -> Vec<String> {
    labels
        .into_iter()
        .map(|label| label.trim().to_owned())
        .filter(|label| !label.is_empty())
        .collect()
}
