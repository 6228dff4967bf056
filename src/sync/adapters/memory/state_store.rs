//! In-memory sync state store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::source::domain::TaskSourceId;
use crate::sync::{
    domain::{SyncStateEntry, SyncStateSnapshot},
    ports::{SyncStateError, SyncStateResult, SyncStateStore},
};
use crate::task::domain::ExternalIssueId;

type SourceVersions = HashMap<ExternalIssueId, DateTime<Utc>>;

/// Thread-safe in-memory sync state store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySyncStateStore {
    sources: Arc<RwLock<HashMap<TaskSourceId, SourceVersions>>>,
}

impl InMemorySyncStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl ToString) -> SyncStateError {
    SyncStateError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SyncStateStore for InMemorySyncStateStore {
    async fn get(&self, source_id: TaskSourceId) -> SyncStateResult<SyncStateSnapshot> {
        let sources = self.sources.read().map_err(poisoned)?;
        let entries = sources
            .get(&source_id)
            .into_iter()
            .flatten()
            .map(|(issue_id, updated_at)| SyncStateEntry::new(issue_id.clone(), *updated_at));
        Ok(SyncStateSnapshot::from_entries(entries))
    }

    async fn upsert_batch(
        &self,
        source_id: TaskSourceId,
        entries: &[SyncStateEntry],
    ) -> SyncStateResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut sources = self.sources.write().map_err(poisoned)?;
        let versions = sources.entry(source_id).or_default();
        for entry in entries {
            versions.insert(entry.issue_id().clone(), entry.issue_updated_at());
        }
        Ok(())
    }
}
