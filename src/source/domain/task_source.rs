//! Task source aggregate and sync status lifecycle.

use super::{
    ParseSyncStatusError, ProjectId, SourceConfig, SourceDomainError, SourceKind, TaskSourceId,
};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of the most recent sync run for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No sync has run yet.
    Idle,
    /// A sync run is in progress (or crashed while in progress).
    Syncing,
    /// The last run finished; individual issues may still have failed.
    Completed,
    /// The last run aborted on a precondition or fetch failure.
    Failed,
}

impl SyncStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Syncing => "syncing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns whether this status ends a run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl TryFrom<&str> for SyncStatus {
    type Error = ParseSyncStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "idle" => Ok(Self::Idle),
            "syncing" => Ok(Self::Syncing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseSyncStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured connection between a project and one external tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSource {
    id: TaskSourceId,
    project_id: ProjectId,
    name: String,
    config: SourceConfig,
    enabled: bool,
    sync_status: SyncStatus,
    sync_started_at: Option<DateTime<Utc>>,
    last_synced_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskSourceData {
    /// Persisted source identifier.
    pub id: TaskSourceId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Provider configuration.
    pub config: SourceConfig,
    /// Enablement flag.
    pub enabled: bool,
    /// Last sync status.
    pub sync_status: SyncStatus,
    /// Start of the in-progress run, if any.
    pub sync_started_at: Option<DateTime<Utc>>,
    /// Completion time of the last successful run.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Sync status fields written back by a run.
///
/// Carries only what a run changes, so configuration and enablement edits
/// made while the run is in flight are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatusUpdate {
    /// New sync status.
    pub status: SyncStatus,
    /// Start of the in-progress run, if any.
    pub sync_started_at: Option<DateTime<Utc>>,
    /// Completion time of the last completed run.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskSource {
    /// Creates an enabled, idle task source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceDomainError::EmptySourceName`] when the name is blank.
    pub fn new(
        project_id: ProjectId,
        name: impl Into<String>,
        config: SourceConfig,
        clock: &impl Clock,
    ) -> Result<Self, SourceDomainError> {
        let raw = name.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(SourceDomainError::EmptySourceName);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskSourceId::new(),
            project_id,
            name: normalized.to_owned(),
            config,
            enabled: true,
            sync_status: SyncStatus::Idle,
            sync_started_at: None,
            last_synced_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task source from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskSourceData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            name: data.name,
            config: data.config,
            enabled: data.enabled,
            sync_status: data.sync_status,
            sync_started_at: data.sync_started_at,
            last_synced_at: data.last_synced_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the source identifier.
    #[must_use]
    pub const fn id(&self) -> TaskSourceId {
        self.id
    }

    /// Returns the owning project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the provider configuration.
    #[must_use]
    pub const fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Returns the source kind.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        self.config.kind()
    }

    /// Returns whether the source is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the last sync status.
    #[must_use]
    pub const fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    /// Returns the start of the in-progress run, if any.
    #[must_use]
    pub const fn sync_started_at(&self) -> Option<DateTime<Utc>> {
        self.sync_started_at
    }

    /// Returns the completion time of the last completed run.
    #[must_use]
    pub const fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the provider configuration.
    pub fn reconfigure(&mut self, config: SourceConfig, clock: &impl Clock) {
        self.config = config;
        self.touch(clock);
    }

    /// Soft-disables the source. Tasks it created are kept.
    pub fn disable(&mut self, clock: &impl Clock) {
        self.enabled = false;
        self.touch(clock);
    }

    /// Re-enables the source.
    pub fn enable(&mut self, clock: &impl Clock) {
        self.enabled = true;
        self.touch(clock);
    }

    /// Marks a run as started and returns the status it replaced.
    pub fn begin_sync(&mut self, clock: &impl Clock) -> SyncStatus {
        let previous = self.sync_status;
        let now = clock.utc();
        self.sync_status = SyncStatus::Syncing;
        self.sync_started_at = Some(now);
        self.updated_at = now;
        previous
    }

    /// Marks the current run as completed at the clock's time.
    pub fn complete_sync(&mut self, clock: &impl Clock) {
        let now = clock.utc();
        self.sync_status = SyncStatus::Completed;
        self.sync_started_at = None;
        self.last_synced_at = Some(now);
        self.updated_at = now;
    }

    /// Marks the current run as failed. The last completed timestamp is kept.
    pub fn fail_sync(&mut self, clock: &impl Clock) {
        self.sync_status = SyncStatus::Failed;
        self.sync_started_at = None;
        self.touch(clock);
    }

    /// Returns the sync status fields for a status-only write.
    #[must_use]
    pub const fn sync_status_update(&self) -> SyncStatusUpdate {
        SyncStatusUpdate {
            status: self.sync_status,
            sync_started_at: self.sync_started_at,
            last_synced_at: self.last_synced_at,
            updated_at: self.updated_at,
        }
    }

    /// Overwrites the sync status fields, leaving configuration untouched.
    pub fn apply_sync_status_update(&mut self, update: SyncStatusUpdate) {
        self.sync_status = update.status;
        self.sync_started_at = update.sync_started_at;
        self.last_synced_at = update.last_synced_at;
        self.updated_at = update.updated_at;
    }

    /// Returns whether a `syncing` status has outlived `threshold`.
    ///
    /// A `syncing` status without a start time is always stale. Nothing resets
    /// stale statuses automatically; callers decide what to do with the answer.
    #[must_use]
    pub fn is_sync_stale(&self, now: DateTime<Utc>, threshold: TimeDelta) -> bool {
        if self.sync_status != SyncStatus::Syncing {
            return false;
        }
        self.sync_started_at
            .is_none_or(|started| now.signed_duration_since(started) >= threshold)
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
