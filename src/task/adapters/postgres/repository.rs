//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{TaskRefreshChangeset, TaskRow},
    schema::tasks,
};
use crate::pg::{PgPool, run_blocking};
use crate::source::domain::{ProjectId, TaskSourceId};
use crate::task::{
    domain::{
        IssueKey, IssueProvider, PersistedTaskData, ProviderIssue, Task, TaskId, TaskStatus,
        UpsertOutcome,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use serde_json::Value;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn upsert(&self, candidate: &Task) -> TaskRepositoryResult<(Task, UpsertOutcome)> {
        let candidate_row = to_row(candidate)?;
        let owned_candidate = candidate.clone();

        run_blocking(
            &self.pool,
            TaskRepositoryError::persistence_boxed,
            move |connection| {
                connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                    // ON CONFLICT waits for a concurrent insert of the same key
                    // to commit, so the refresh path below always sees it.
                    let inserted = diesel::insert_into(tasks::table)
                        .values(&candidate_row)
                        .on_conflict((tasks::external_provider, tasks::external_id))
                        .do_nothing()
                        .execute(tx)?;
                    if inserted == 1 {
                        return Ok((owned_candidate, UpsertOutcome::Created));
                    }

                    let existing_row = tasks::table
                        .filter(tasks::external_provider.eq(&candidate_row.external_provider))
                        .filter(tasks::external_id.eq(&candidate_row.external_id))
                        .select(TaskRow::as_select())
                        .for_update()
                        .first::<TaskRow>(tx)?;
                    let mut existing = row_to_task(existing_row)?;
                    let changed = existing
                        .apply_issue_snapshot(
                            owned_candidate.source_issue(),
                            owned_candidate.updated_at(),
                        )
                        .map_err(TaskRepositoryError::persistence)?;
                    if !changed {
                        return Ok((existing, UpsertOutcome::Unchanged));
                    }

                    let changes = refresh_changeset(&existing)?;
                    diesel::update(tasks::table.find(existing.id().into_inner()))
                        .set(&changes)
                        .execute(tx)?;
                    Ok((existing, UpsertOutcome::Updated))
                })
            },
        )
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        run_blocking(
            &self.pool,
            TaskRepositoryError::persistence_boxed,
            move |connection| {
                let row = tasks::table
                    .find(id.into_inner())
                    .select(TaskRow::as_select())
                    .first::<TaskRow>(connection)
                    .optional()?;
                row.map(row_to_task).transpose()
            },
        )
        .await
    }

    async fn find_by_issue_key(&self, key: &IssueKey) -> TaskRepositoryResult<Option<Task>> {
        let lookup_key = key.clone();
        run_blocking(
            &self.pool,
            TaskRepositoryError::persistence_boxed,
            move |connection| {
                let row = find_row_by_issue_key(connection, &lookup_key)?;
                row.map(row_to_task).transpose()
            },
        )
        .await
    }

    async fn list_by_source(&self, source_id: TaskSourceId) -> TaskRepositoryResult<Vec<Task>> {
        run_blocking(
            &self.pool,
            TaskRepositoryError::persistence_boxed,
            move |connection| {
                let rows = tasks::table
                    .filter(tasks::task_source_id.eq(source_id.into_inner()))
                    .order(tasks::created_at.asc())
                    .select(TaskRow::as_select())
                    .load::<TaskRow>(connection)?;
                rows.into_iter().map(row_to_task).collect()
            },
        )
        .await
    }
}

fn find_row_by_issue_key(
    connection: &mut PgConnection,
    key: &IssueKey,
) -> TaskRepositoryResult<Option<TaskRow>> {
    Ok(tasks::table
        .filter(tasks::external_provider.eq(key.provider().as_str()))
        .filter(tasks::external_id.eq(key.external_id().as_str()))
        .select(TaskRow::as_select())
        .first::<TaskRow>(connection)
        .optional()?)
}

/// Sub-record columns in `(gitlab, github, jira)` order.
type SubRecordColumns = (Option<Value>, Option<Value>, Option<Value>);

fn sub_record_columns(source_issue: &ProviderIssue) -> TaskRepositoryResult<SubRecordColumns> {
    let payload = source_issue
        .to_compact_json()
        .map_err(TaskRepositoryError::persistence)?;
    Ok(match source_issue.provider() {
        IssueProvider::GitLab => (Some(payload), None, None),
        IssueProvider::GitHub => (None, Some(payload), None),
        IssueProvider::Jira => (None, None, Some(payload)),
    })
}

pub(super) fn to_row(task: &Task) -> TaskRepositoryResult<TaskRow> {
    let key = task.issue_key();
    let (source_gitlab_issue, source_github_issue, source_jira_issue) =
        sub_record_columns(task.source_issue())?;

    Ok(TaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().into_inner(),
        task_source_id: task.task_source_id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().map(ToOwned::to_owned),
        status: task.status().as_str().to_owned(),
        external_provider: key.provider().as_str().to_owned(),
        external_id: key.external_id().as_str().to_owned(),
        source_gitlab_issue,
        source_github_issue,
        source_jira_issue,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn refresh_changeset(task: &Task) -> TaskRepositoryResult<TaskRefreshChangeset> {
    let (source_gitlab_issue, source_github_issue, source_jira_issue) =
        sub_record_columns(task.source_issue())?;
    Ok(TaskRefreshChangeset {
        title: task.title().to_owned(),
        description: task.description().map(ToOwned::to_owned),
        source_gitlab_issue,
        source_github_issue,
        source_jira_issue,
        updated_at: task.updated_at(),
    })
}

pub(super) fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        project_id,
        task_source_id,
        title,
        description,
        status: persisted_status,
        external_provider,
        source_gitlab_issue,
        source_github_issue,
        source_jira_issue,
        created_at,
        updated_at,
        ..
    } = row;

    let provider = IssueProvider::try_from(external_provider.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let payload = match provider {
        IssueProvider::GitLab => source_gitlab_issue,
        IssueProvider::GitHub => source_github_issue,
        IssueProvider::Jira => source_jira_issue,
    }
    .ok_or_else(|| {
        TaskRepositoryError::persistence(std::io::Error::other(format!(
            "task {id} has no {provider} sub-record"
        )))
    })?;
    let source_issue = ProviderIssue::from_compact_json(provider, payload)
        .map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        task_source_id: TaskSourceId::from_uuid(task_source_id),
        title,
        description,
        status,
        source_issue,
        created_at,
        updated_at,
    }))
}
