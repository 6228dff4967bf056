//! `PostgreSQL` sync state store.

use super::{models::SyncStateRow, schema::sync_state};
use crate::pg::{PgPool, run_blocking};
use crate::source::domain::TaskSourceId;
use crate::sync::{
    domain::{SyncStateEntry, SyncStateSnapshot},
    ports::{SyncStateError, SyncStateResult, SyncStateStore},
};
use crate::task::domain::ExternalIssueId;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;

/// `PostgreSQL`-backed sync state store.
#[derive(Debug, Clone)]
pub struct PostgresSyncStateStore {
    pool: PgPool,
}

impl PostgresSyncStateStore {
    /// Creates a store from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncStateStore for PostgresSyncStateStore {
    async fn get(&self, source_id: TaskSourceId) -> SyncStateResult<SyncStateSnapshot> {
        run_blocking(
            &self.pool,
            SyncStateError::persistence_boxed,
            move |connection| {
                let rows = sync_state::table
                    .filter(sync_state::task_source_id.eq(source_id.into_inner()))
                    .select(SyncStateRow::as_select())
                    .load::<SyncStateRow>(connection)
                    .map_err(SyncStateError::persistence)?;
                let entries = rows
                    .into_iter()
                    .map(row_to_entry)
                    .collect::<SyncStateResult<Vec<_>>>()?;
                Ok(SyncStateSnapshot::from_entries(entries))
            },
        )
        .await
    }

    async fn upsert_batch(
        &self,
        source_id: TaskSourceId,
        entries: &[SyncStateEntry],
    ) -> SyncStateResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let rows = to_rows(source_id, entries);
        run_blocking(
            &self.pool,
            SyncStateError::persistence_boxed,
            move |connection| {
                connection
                    .transaction(|tx| {
                        diesel::insert_into(sync_state::table)
                            .values(&rows)
                            .on_conflict((sync_state::task_source_id, sync_state::issue_id))
                            .do_update()
                            .set(
                                sync_state::issue_updated_at
                                    .eq(excluded(sync_state::issue_updated_at)),
                            )
                            .execute(tx)
                    })
                    .map_err(SyncStateError::persistence)?;
                Ok(())
            },
        )
        .await
    }
}

fn to_rows(source_id: TaskSourceId, entries: &[SyncStateEntry]) -> Vec<SyncStateRow> {
    entries
        .iter()
        .map(|entry| SyncStateRow {
            task_source_id: source_id.into_inner(),
            issue_id: entry.issue_id().as_str().to_owned(),
            issue_updated_at: entry.issue_updated_at(),
        })
        .collect()
}

fn row_to_entry(row: SyncStateRow) -> SyncStateResult<SyncStateEntry> {
    let issue_id = ExternalIssueId::new(row.issue_id).map_err(SyncStateError::persistence)?;
    Ok(SyncStateEntry::new(issue_id, row.issue_updated_at))
}
