//! Sync orchestration for one task source.
//!
//! A run moves the source through `idle -> syncing -> completed | failed`,
//! streams issues from the source's connector, upserts the new and changed
//! ones under per-issue work locks, and records the processed versions in one
//! batch. Only precondition and fetch failures fail a run; everything else is
//! reported per issue.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::TimeDelta;
use futures_util::StreamExt;
use mockable::Clock;
use tracing::{debug, info, instrument, warn};

use crate::connector::{ConnectorError, ConnectorFactory, IssueStream};
use crate::source::{
    domain::{SourceKind, SyncStatus, TaskSource, TaskSourceId},
    ports::{ProjectRepository, TaskSourceRepository},
};
use crate::sync::{
    domain::{
        DownstreamEvent, IssueChange, LockKey, SyncConfig, SyncRequest, SyncRunError,
        SyncRunResult, SyncStateEntry, SyncStateSnapshot,
    },
    ports::{EventPublisher, SyncStateStore, WorkLock},
};
use crate::task::{
    domain::{SourceIssue, Task, UpsertOutcome},
    services::TaskUpserter,
};

/// Collaborators a [`SyncOrchestrator`] drives.
#[derive(Clone)]
pub struct SyncPorts {
    /// Task source lookup and status persistence.
    pub sources: Arc<dyn TaskSourceRepository>,
    /// Project lookup.
    pub projects: Arc<dyn ProjectRepository>,
    /// Connector selection by source kind.
    pub connectors: Arc<dyn ConnectorFactory>,
    /// Processed issue versions.
    pub sync_state: Arc<dyn SyncStateStore>,
    /// Per-issue work claims.
    pub work_lock: Arc<dyn WorkLock>,
    /// Task create-or-update.
    pub tasks: Arc<dyn TaskUpserter>,
    /// Downstream evaluation requests.
    pub events: Arc<dyn EventPublisher>,
}

/// Runs syncs for task sources.
///
/// Work locks are claimed under the configured worker id, which is shared by
/// every run of one orchestrator. Runs of the same orchestrator must not
/// overlap; concurrent runs need orchestrators with distinct worker ids.
#[derive(Clone)]
pub struct SyncOrchestrator<C>
where
    C: Clock + Send + Sync,
{
    ports: SyncPorts,
    clock: Arc<C>,
    config: SyncConfig,
}

impl<C> SyncOrchestrator<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator.
    #[must_use]
    pub const fn new(ports: SyncPorts, clock: Arc<C>, config: SyncConfig) -> Self {
        Self {
            ports,
            clock,
            config,
        }
    }

    /// Returns the configuration runs use.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Runs a sync described by a queue message.
    pub async fn run_request(&self, request: SyncRequest) -> SyncRunResult {
        self.run(request.task_source_id, request.provider).await
    }

    /// Syncs one task source.
    ///
    /// Never fails: aborts are reported through the result's status and
    /// errors.
    #[instrument(
        name = "sync_run",
        skip_all,
        fields(task_source_id = %task_source_id, provider = %provider)
    )]
    pub async fn run(&self, task_source_id: TaskSourceId, provider: SourceKind) -> SyncRunResult {
        let mut result = SyncRunResult::new(task_source_id);

        let found = match self.load_source(task_source_id).await {
            Ok(found) => found,
            Err(error) => return self.finish_aborted(None, error, result).await,
        };
        if let Some(error) = self.precondition_failure(&found, provider).await {
            return self.finish_aborted(Some(found), error, result).await;
        }

        let mut source = self.begin(found, &mut result).await;
        let (stream, snapshot) = match self.open(&source).await {
            Ok(opened) => opened,
            Err(error) => return self.finish_aborted(Some(source), error, result).await,
        };

        let (batch, fetch_error) = self
            .process_stream(&source, stream, &snapshot, &mut result)
            .await;
        self.record_batch(task_source_id, &batch, &mut result).await;

        match fetch_error {
            Some(err) => {
                warn!(error = %err, "fetch failed mid-stream; run marked failed");
                result.errors.push(SyncRunError::fetch(err.to_string()));
                source.fail_sync(&*self.clock);
            }
            None => source.complete_sync(&*self.clock),
        }
        self.persist_status(&source, &mut result).await;
        result.status = source.sync_status();

        info!(
            status = %result.status,
            created = result.tasks_created,
            updated = result.tasks_updated,
            unchanged = result.tasks_unchanged,
            skipped = result.issues_skipped,
            errors = result.errors.len(),
            "sync run finished"
        );
        result
    }

    async fn load_source(&self, task_source_id: TaskSourceId) -> Result<TaskSource, SyncRunError> {
        match self.ports.sources.find_by_id(task_source_id).await {
            Ok(Some(source)) => Ok(source),
            Ok(None) => Err(SyncRunError::precondition(format!(
                "task source {task_source_id} not found"
            ))),
            Err(err) => Err(SyncRunError::precondition(format!(
                "task source {task_source_id} could not be loaded: {err}"
            ))),
        }
    }

    /// Moves the source to `syncing`, warning when it already was.
    ///
    /// The `syncing` status is only a soft gate; per-issue work locks keep
    /// overlapping runs from creating duplicate tasks.
    async fn begin(&self, found: TaskSource, result: &mut SyncRunResult) -> TaskSource {
        let mut source = found;
        if source.sync_status() == SyncStatus::Syncing {
            let threshold =
                TimeDelta::from_std(self.config.stale_sync_after()).unwrap_or(TimeDelta::MAX);
            if source.is_sync_stale(self.clock.utc(), threshold) {
                warn!(
                    sync_started_at = ?source.sync_started_at(),
                    "source is stuck in syncing from an earlier run; starting anyway"
                );
            } else {
                warn!("another sync run for this source appears to be in progress");
            }
        }
        source.begin_sync(&*self.clock);
        self.persist_status(&source, result).await;
        source
    }

    async fn precondition_failure(
        &self,
        source: &TaskSource,
        provider: SourceKind,
    ) -> Option<SyncRunError> {
        if source.kind() != provider {
            return Some(SyncRunError::precondition(format!(
                "task source {} is {}, not {provider}",
                source.id(),
                source.kind()
            )));
        }
        if !source.is_enabled() {
            return Some(SyncRunError::precondition(format!(
                "task source {} is disabled",
                source.id()
            )));
        }
        match self.ports.projects.find_by_id(source.project_id()).await {
            Ok(Some(project)) if project.is_enabled() => None,
            Ok(Some(_)) => Some(SyncRunError::precondition(format!(
                "project {} is disabled",
                source.project_id()
            ))),
            Ok(None) => Some(SyncRunError::precondition(format!(
                "project {} not found",
                source.project_id()
            ))),
            Err(err) => Some(SyncRunError::precondition(format!(
                "project {} could not be loaded: {err}",
                source.project_id()
            ))),
        }
    }

    /// Opens the issue stream and loads the recorded versions.
    async fn open(
        &self,
        source: &TaskSource,
    ) -> Result<(IssueStream, SyncStateSnapshot), SyncRunError> {
        let connector = self
            .ports
            .connectors
            .connector_for(source.kind())
            .map_err(|err| SyncRunError::fetch(err.to_string()))?;
        let stream = connector.fetch_issues(source);
        let snapshot = self
            .ports
            .sync_state
            .get(source.id())
            .await
            .map_err(|err| SyncRunError::state(format!("sync state could not be loaded: {err}")))?;
        debug!(recorded = snapshot.len(), "loaded sync state");
        Ok((stream, snapshot))
    }

    /// Processes issues in connector order until the stream ends or fails.
    ///
    /// The batch holds one entry per issue id; an issue fetched twice keeps
    /// the version processed last.
    async fn process_stream(
        &self,
        source: &TaskSource,
        mut stream: IssueStream,
        snapshot: &SyncStateSnapshot,
        result: &mut SyncRunResult,
    ) -> (Vec<SyncStateEntry>, Option<ConnectorError>) {
        let mut batch = BTreeMap::new();
        let mut fetch_error = None;
        while let Some(item) = stream.next().await {
            match item {
                Ok(issue) => {
                    if let Some(entry) = self.process_issue(source, &issue, snapshot, result).await {
                        batch.insert(entry.issue_id().clone(), entry);
                    }
                }
                Err(ConnectorError::InvalidIssue { issue_id, message }) => {
                    warn!(%issue_id, error = %message, "issue could not be mapped");
                    result
                        .errors
                        .push(SyncRunError::unmapped_issue(&issue_id, message));
                }
                Err(err) => {
                    fetch_error = Some(err);
                    break;
                }
            }
        }
        (batch.into_values().collect(), fetch_error)
    }

    /// Upserts one issue when it is new or changed.
    ///
    /// Returns the sync state entry to record when the upsert succeeded.
    async fn process_issue(
        &self,
        source: &TaskSource,
        issue: &SourceIssue,
        snapshot: &SyncStateSnapshot,
        result: &mut SyncRunResult,
    ) -> Option<SyncStateEntry> {
        let change = snapshot.classify(issue);
        if !change.needs_upsert() {
            result.issues_skipped += 1;
            debug!(issue_id = %issue.id(), "issue unchanged since last sync");
            return None;
        }

        let key = LockKey::for_issue(&issue.issue_key());
        let holder = self.config.worker_id();
        match self
            .ports
            .work_lock
            .try_acquire(&key, holder, self.config.lease_duration())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                result.issues_skipped += 1;
                debug!(lock_key = %key, "issue claimed by another run; skipping");
                return None;
            }
            Err(err) => {
                result.errors.push(SyncRunError::issue(
                    issue.id().clone(),
                    format!("work lock could not be acquired: {err}"),
                ));
                return None;
            }
        }

        let entry = self.upsert_issue(source, issue, change, result).await;

        match self.ports.work_lock.release(&key, holder).await {
            Ok(true) => {}
            Ok(false) => warn!(lock_key = %key, "work lock lease lapsed before release"),
            Err(err) => result.errors.push(SyncRunError::issue(
                issue.id().clone(),
                format!("work lock could not be released: {err}"),
            )),
        }
        entry
    }

    async fn upsert_issue(
        &self,
        source: &TaskSource,
        issue: &SourceIssue,
        change: IssueChange,
        result: &mut SyncRunResult,
    ) -> Option<SyncStateEntry> {
        let upserted = match self
            .ports
            .tasks
            .upsert(source.id(), source.project_id(), issue)
            .await
        {
            Ok(upserted) => upserted,
            Err(err) => {
                warn!(issue_id = %issue.id(), error = %err, "issue could not be upserted");
                result
                    .errors
                    .push(SyncRunError::issue(issue.id().clone(), err.to_string()));
                return None;
            }
        };

        debug!(issue_id = %issue.id(), ?change, outcome = ?upserted.outcome, "processed issue");
        match upserted.outcome {
            UpsertOutcome::Created => {
                result.tasks_created += 1;
                self.enqueue_evaluation(&upserted.task).await;
            }
            UpsertOutcome::Updated => result.tasks_updated += 1,
            UpsertOutcome::Unchanged => result.tasks_unchanged += 1,
        }
        Some(SyncStateEntry::for_issue(issue))
    }

    async fn enqueue_evaluation(&self, task: &Task) {
        let event = DownstreamEvent::evaluation_requested(task, self.clock.utc());
        if let Err(err) = self.ports.events.publish(&event).await {
            warn!(task_id = %task.id(), error = %err, "evaluation request could not be enqueued");
        }
    }

    async fn record_batch(
        &self,
        task_source_id: TaskSourceId,
        batch: &[SyncStateEntry],
        result: &mut SyncRunResult,
    ) {
        if batch.is_empty() {
            return;
        }
        if let Err(err) = self.ports.sync_state.upsert_batch(task_source_id, batch).await {
            warn!(error = %err, entries = batch.len(), "sync state batch could not be written");
            result.errors.push(SyncRunError::state(format!(
                "sync state batch could not be written: {err}"
            )));
        }
    }

    async fn persist_status(&self, source: &TaskSource, result: &mut SyncRunResult) {
        if let Err(err) = self
            .ports
            .sources
            .update_sync_status(source.id(), source.sync_status_update())
            .await
        {
            warn!(status = %source.sync_status(), error = %err, "source status could not be saved");
            result.errors.push(SyncRunError::state(format!(
                "source status {} could not be saved: {err}",
                source.sync_status()
            )));
        }
    }

    async fn finish_aborted(
        &self,
        source: Option<TaskSource>,
        error: SyncRunError,
        mut result: SyncRunResult,
    ) -> SyncRunResult {
        warn!(kind = %error.kind(), error = %error.message(), "sync run aborted");
        result.errors.push(error);
        result.status = SyncStatus::Failed;
        if let Some(mut failed) = source {
            failed.fail_sync(&*self.clock);
            self.persist_status(&failed, &mut result).await;
        }
        result
    }
}
