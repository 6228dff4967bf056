//! Shared fixtures for sync integration and behaviour tests.
//!
//! Everything runs on in-memory adapters with a manually advanced clock, so
//! scenarios can move time forward to expire leases.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use eyre::WrapErr;
use mockable::Clock;
use tracksync::connector::adapters::{InMemoryConnector, StaticConnectorFactory};
use tracksync::source::{
    adapters::memory::{InMemoryProjectRepository, InMemoryTaskSourceRepository},
    domain::{
        EncryptedCredential, GitHubSourceConfig, GitLabSourceConfig, JiraSourceConfig, Project,
        SourceConfig, SourceKind, TaskSource,
    },
    ports::{ProjectRepository, TaskSourceRepository},
};
use tracksync::sync::{
    adapters::memory::{InMemorySyncStateStore, InMemoryWorkLock, RecordingEventPublisher},
    domain::{HolderId, SyncConfig},
    services::{SyncOrchestrator, SyncPorts},
};
use tracksync::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{
        ExternalIssueId, IssueMetadata, IssueNumber, RepositoryFullName, SourceIssue,
    },
    services::TaskUpsertService,
};

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward.
    ///
    /// # Errors
    ///
    /// Returns an error when the clock mutex is poisoned or the duration
    /// overflows.
    pub fn advance(&self, by: Duration) -> Result<(), eyre::Report> {
        let delta = TimeDelta::from_std(by).wrap_err("representable duration")?;
        let mut now = self
            .now
            .lock()
            .map_err(|_| eyre::eyre!("clock mutex poisoned"))?;
        *now += delta;
        Ok(())
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map_or_else(|poisoned| *poisoned.into_inner(), |now| *now)
    }
}

/// Parses an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns an error when the text is not RFC 3339.
pub fn timestamp(value: &str) -> Result<DateTime<Utc>, eyre::Report> {
    Ok(DateTime::parse_from_rfc3339(value)
        .wrap_err_with(|| format!("parse timestamp {value}"))?
        .with_timezone(&Utc))
}

/// In-memory adapters wired around one project.
pub struct SyncFixture {
    pub clock: Arc<ManualClock>,
    pub sources: Arc<InMemoryTaskSourceRepository>,
    pub projects: Arc<InMemoryProjectRepository>,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub sync_state: Arc<InMemorySyncStateStore>,
    pub work_lock: Arc<InMemoryWorkLock<ManualClock>>,
    pub events: Arc<RecordingEventPublisher>,
    pub gitlab: Arc<InMemoryConnector>,
    pub github: Arc<InMemoryConnector>,
    pub jira: Arc<InMemoryConnector>,
    pub project: Project,
}

impl SyncFixture {
    /// Creates the adapters around an enabled project.
    ///
    /// The project is stored together with the first source.
    ///
    /// # Errors
    ///
    /// Returns an error when the fixture clock or project cannot be built.
    pub fn new() -> Result<Self, eyre::Report> {
        let clock = Arc::new(ManualClock::at(timestamp("2024-01-10T00:00:00Z")?));
        let project = Project::new("Widgets").wrap_err("project")?;

        Ok(Self {
            work_lock: Arc::new(InMemoryWorkLock::new(Arc::clone(&clock))),
            clock,
            sources: Arc::new(InMemoryTaskSourceRepository::new()),
            projects: Arc::new(InMemoryProjectRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
            sync_state: Arc::new(InMemorySyncStateStore::new()),
            events: Arc::new(RecordingEventPublisher::new()),
            gitlab: Arc::new(InMemoryConnector::new(SourceKind::GitlabIssues)),
            github: Arc::new(InMemoryConnector::new(SourceKind::GithubIssues)),
            jira: Arc::new(InMemoryConnector::new(SourceKind::Jira)),
            project,
        })
    }

    /// Returns the scripted connector for a source kind.
    pub fn connector(&self, kind: SourceKind) -> &InMemoryConnector {
        match kind {
            SourceKind::GitlabIssues => &self.gitlab,
            SourceKind::GithubIssues => &self.github,
            SourceKind::Jira => &self.jira,
        }
    }

    /// Stores a source of the given kind under the fixture's project.
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot be built or stored.
    pub async fn add_source(&self, kind: SourceKind) -> Result<TaskSource, eyre::Report> {
        let credential = EncryptedCredential::new("token").wrap_err("credential")?;
        let config = match kind {
            SourceKind::GitlabIssues => SourceConfig::GitLab(
                GitLabSourceConfig::new("acme/widgets", credential).wrap_err("gitlab config")?,
            ),
            SourceKind::GithubIssues => SourceConfig::GitHub(GitHubSourceConfig::new(
                RepositoryFullName::new("acme/widgets").wrap_err("repository")?,
                credential,
            )),
            SourceKind::Jira => SourceConfig::Jira(
                JiraSourceConfig::new("https://acme.atlassian.net", "OPS", "bot@acme.io", credential)
                    .wrap_err("jira config")?,
            ),
        };
        if self.projects.find_by_id(self.project.id()).await?.is_none() {
            self.projects
                .store(&self.project)
                .await
                .wrap_err("store project")?;
        }
        let source = TaskSource::new(self.project.id(), format!("{kind} source"), config, &*self.clock)
            .wrap_err("task source")?;
        self.sources.store(&source).await.wrap_err("store source")?;
        Ok(source)
    }

    /// Builds the orchestrator ports over the fixture's adapters.
    pub fn ports(&self) -> SyncPorts {
        let connectors = StaticConnectorFactory::new()
            .with_connector(Arc::clone(&self.gitlab) as _)
            .with_connector(Arc::clone(&self.github) as _)
            .with_connector(Arc::clone(&self.jira) as _);
        SyncPorts {
            sources: Arc::clone(&self.sources) as _,
            projects: Arc::clone(&self.projects) as _,
            connectors: Arc::new(connectors),
            sync_state: Arc::clone(&self.sync_state) as _,
            work_lock: Arc::clone(&self.work_lock) as _,
            tasks: Arc::new(TaskUpsertService::new(
                Arc::clone(&self.tasks),
                Arc::clone(&self.clock),
            )),
            events: Arc::clone(&self.events) as _,
        }
    }

    /// Builds an orchestrator claiming locks as `worker`.
    ///
    /// # Errors
    ///
    /// Returns an error when the worker id is blank.
    pub fn orchestrator(&self, worker: &str) -> Result<SyncOrchestrator<ManualClock>, eyre::Report> {
        let config = SyncConfig::default().with_worker_id(HolderId::new(worker)?);
        Ok(SyncOrchestrator::new(
            self.ports(),
            Arc::clone(&self.clock),
            config,
        ))
    }
}

/// Builds a tracker issue of the given kind.
///
/// # Errors
///
/// Returns an error when the id is not a positive number.
pub fn issue(
    kind: SourceKind,
    id: &str,
    title: &str,
    updated_at: DateTime<Utc>,
) -> Result<SourceIssue, eyre::Report> {
    let number: u64 = id.parse().wrap_err("numeric issue id")?;
    let external_id = ExternalIssueId::new(id)?;
    let iid = IssueNumber::new(number)?;
    let issue = match kind {
        SourceKind::GitlabIssues => SourceIssue::new(
            external_id,
            title,
            updated_at,
            IssueMetadata::GitLab {
                host: "https://gitlab.com".to_owned(),
                project_path: "acme/widgets".to_owned(),
                web_url: Some(format!("https://gitlab.com/acme/widgets/-/issues/{id}")),
            },
        )
        .with_iid(iid),
        SourceKind::GithubIssues => SourceIssue::new(
            external_id,
            title,
            updated_at,
            IssueMetadata::GitHub {
                repository: RepositoryFullName::new("acme/widgets")?,
                web_url: Some(format!("https://github.com/acme/widgets/issues/{id}")),
            },
        )
        .with_iid(iid),
        SourceKind::Jira => SourceIssue::new(
            external_id,
            title,
            updated_at,
            IssueMetadata::Jira {
                host: "https://acme.atlassian.net".to_owned(),
                project_key: "OPS".to_owned(),
                issue_key: format!("OPS-{id}"),
                web_url: Some(format!("https://acme.atlassian.net/browse/OPS-{id}")),
            },
        ),
    };
    Ok(issue)
}
