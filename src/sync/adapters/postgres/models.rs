//! Diesel row models for sync state.

use super::schema::sync_state;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query and insert row for sync state entries.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sync_state)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SyncStateRow {
    /// Owning task source.
    pub task_source_id: uuid::Uuid,
    /// Provider issue id.
    pub issue_id: String,
    /// Processed issue version.
    pub issue_updated_at: DateTime<Utc>,
}
