//! Diesel row models for task sources and projects.

use super::schema::{projects, task_sources};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query and insert row for projects.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Enablement flag.
    pub enabled: bool,
}

/// Query and insert row for task sources.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = task_sources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskSourceRow {
    /// Source identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Source kind.
    pub kind: String,
    /// Provider configuration payload.
    pub config: Value,
    /// Enablement flag.
    pub enabled: bool,
    /// Last sync status.
    pub sync_status: String,
    /// Start of the in-progress run.
    pub sync_started_at: Option<DateTime<Utc>>,
    /// Completion time of the last completed run.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
