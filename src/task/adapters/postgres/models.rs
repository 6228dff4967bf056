//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query and insert row for task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Source that created the task.
    pub task_source_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: String,
    /// Issue provider.
    pub external_provider: String,
    /// Provider issue id.
    pub external_id: String,
    /// GitLab issue sub-record.
    pub source_gitlab_issue: Option<Value>,
    /// GitHub issue sub-record.
    pub source_github_issue: Option<Value>,
    /// Jira ticket sub-record.
    pub source_jira_issue: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Columns rewritten when a task is refreshed from a newer issue snapshot.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskRefreshChangeset {
    /// Refreshed title.
    pub title: String,
    /// Refreshed description.
    pub description: Option<String>,
    /// Refreshed GitLab sub-record.
    pub source_gitlab_issue: Option<Value>,
    /// Refreshed GitHub sub-record.
    pub source_github_issue: Option<Value>,
    /// Refreshed Jira sub-record.
    pub source_jira_issue: Option<Value>,
    /// Refresh timestamp.
    pub updated_at: DateTime<Utc>,
}
