//! Connector factories.

use super::{GitHubConnector, GitLabConnector, JiraConnector};
use crate::connector::{
    ConnectorError, ConnectorFactory, ConnectorResult, HttpSettings, IssueConnector,
};
use crate::source::{domain::SourceKind, ports::CredentialResolver};
use std::collections::HashMap;
use std::sync::Arc;

/// Factory serving the three HTTP adapters around one shared client.
#[derive(Clone)]
pub struct HttpConnectorFactory {
    gitlab: Arc<dyn IssueConnector>,
    github: Arc<dyn IssueConnector>,
    jira: Arc<dyn IssueConnector>,
}

impl HttpConnectorFactory {
    /// Builds the HTTP adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Configuration`] when the HTTP client cannot
    /// be built.
    pub fn new(
        settings: &HttpSettings,
        credentials: Arc<dyn CredentialResolver>,
    ) -> ConnectorResult<Self> {
        let client = settings.build_client()?;
        Ok(Self {
            gitlab: Arc::new(GitLabConnector::new(client.clone(), Arc::clone(&credentials))),
            github: Arc::new(GitHubConnector::new(client.clone(), Arc::clone(&credentials))),
            jira: Arc::new(JiraConnector::new(client, credentials)),
        })
    }
}

impl ConnectorFactory for HttpConnectorFactory {
    fn connector_for(&self, kind: SourceKind) -> ConnectorResult<Arc<dyn IssueConnector>> {
        let connector = match kind {
            SourceKind::GitlabIssues => &self.gitlab,
            SourceKind::GithubIssues => &self.github,
            SourceKind::Jira => &self.jira,
        };
        Ok(Arc::clone(connector))
    }
}

/// Factory over an explicit set of connectors.
#[derive(Clone, Default)]
pub struct StaticConnectorFactory {
    connectors: HashMap<SourceKind, Arc<dyn IssueConnector>>,
}

impl StaticConnectorFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connector under its own kind, replacing any previous one.
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn IssueConnector>) -> Self {
        self.connectors.insert(connector.kind(), connector);
        self
    }
}

impl ConnectorFactory for StaticConnectorFactory {
    fn connector_for(&self, kind: SourceKind) -> ConnectorResult<Arc<dyn IssueConnector>> {
        self.connectors
            .get(&kind)
            .cloned()
            .ok_or_else(|| ConnectorError::configuration(format!("no connector for {kind}")))
    }
}
