//! `PostgreSQL` repositories for task sources and projects.

use super::{
    models::{ProjectRow, TaskSourceRow},
    schema::{projects, task_sources},
};
use crate::pg::{PgPool, run_blocking};
use crate::source::{
    domain::{
        PersistedTaskSourceData, Project, ProjectId, SourceConfig, SyncStatus, SyncStatusUpdate,
        TaskSource, TaskSourceId,
    },
    ports::{ProjectRepository, SourceRepositoryError, SourceRepositoryResult, TaskSourceRepository},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed task source repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskSourceRepository {
    pool: PgPool,
}

impl PostgresTaskSourceRepository {
    /// Creates a repository from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskSourceRepository for PostgresTaskSourceRepository {
    async fn store(&self, source: &TaskSource) -> SourceRepositoryResult<()> {
        let source_id = source.id();
        let row = to_source_row(source)?;
        run_blocking(
            &self.pool,
            SourceRepositoryError::persistence_boxed,
            move |connection| {
                diesel::insert_into(task_sources::table)
                    .values(&row)
                    .execute(connection)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            SourceRepositoryError::DuplicateSource(source_id)
                        }
                        _ => SourceRepositoryError::persistence(err),
                    })?;
                Ok(())
            },
        )
        .await
    }

    async fn update(&self, source: &TaskSource) -> SourceRepositoryResult<()> {
        let source_id = source.id();
        let row = to_source_row(source)?;
        run_blocking(
            &self.pool,
            SourceRepositoryError::persistence_boxed,
            move |connection| {
                let updated = diesel::update(task_sources::table.find(row.id))
                    .set(&row)
                    .execute(connection)
                    .map_err(SourceRepositoryError::persistence)?;
                if updated == 0 {
                    return Err(SourceRepositoryError::SourceNotFound(source_id));
                }
                Ok(())
            },
        )
        .await
    }

    async fn update_sync_status(
        &self,
        id: TaskSourceId,
        update: SyncStatusUpdate,
    ) -> SourceRepositoryResult<()> {
        run_blocking(
            &self.pool,
            SourceRepositoryError::persistence_boxed,
            move |connection| {
                let updated = diesel::update(task_sources::table.find(id.into_inner()))
                    .set((
                        task_sources::sync_status.eq(update.status.as_str()),
                        task_sources::sync_started_at.eq(update.sync_started_at),
                        task_sources::last_synced_at.eq(update.last_synced_at),
                        task_sources::updated_at.eq(update.updated_at),
                    ))
                    .execute(connection)
                    .map_err(SourceRepositoryError::persistence)?;
                if updated == 0 {
                    return Err(SourceRepositoryError::SourceNotFound(id));
                }
                Ok(())
            },
        )
        .await
    }

    async fn find_by_id(&self, id: TaskSourceId) -> SourceRepositoryResult<Option<TaskSource>> {
        run_blocking(
            &self.pool,
            SourceRepositoryError::persistence_boxed,
            move |connection| {
                let row = task_sources::table
                    .find(id.into_inner())
                    .select(TaskSourceRow::as_select())
                    .first::<TaskSourceRow>(connection)
                    .optional()
                    .map_err(SourceRepositoryError::persistence)?;
                row.map(row_to_source).transpose()
            },
        )
        .await
    }
}

/// `PostgreSQL`-backed project repository.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a repository from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn store(&self, project: &Project) -> SourceRepositoryResult<()> {
        let project_id = project.id();
        let row = to_project_row(project);
        run_blocking(
            &self.pool,
            SourceRepositoryError::persistence_boxed,
            move |connection| {
                diesel::insert_into(projects::table)
                    .values(&row)
                    .execute(connection)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            SourceRepositoryError::DuplicateProject(project_id)
                        }
                        _ => SourceRepositoryError::persistence(err),
                    })?;
                Ok(())
            },
        )
        .await
    }

    async fn update(&self, project: &Project) -> SourceRepositoryResult<()> {
        let project_id = project.id();
        let row = to_project_row(project);
        run_blocking(
            &self.pool,
            SourceRepositoryError::persistence_boxed,
            move |connection| {
                let updated = diesel::update(projects::table.find(row.id))
                    .set(&row)
                    .execute(connection)
                    .map_err(SourceRepositoryError::persistence)?;
                if updated == 0 {
                    return Err(SourceRepositoryError::ProjectNotFound(project_id));
                }
                Ok(())
            },
        )
        .await
    }

    async fn find_by_id(&self, id: ProjectId) -> SourceRepositoryResult<Option<Project>> {
        run_blocking(
            &self.pool,
            SourceRepositoryError::persistence_boxed,
            move |connection| {
                let row = projects::table
                    .find(id.into_inner())
                    .select(ProjectRow::as_select())
                    .first::<ProjectRow>(connection)
                    .optional()
                    .map_err(SourceRepositoryError::persistence)?;
                Ok(row.map(|found| {
                    Project::from_persisted(ProjectId::from_uuid(found.id), found.name, found.enabled)
                }))
            },
        )
        .await
    }
}

fn to_project_row(project: &Project) -> ProjectRow {
    ProjectRow {
        id: project.id().into_inner(),
        name: project.name().to_owned(),
        enabled: project.is_enabled(),
    }
}

pub(super) fn to_source_row(source: &TaskSource) -> SourceRepositoryResult<TaskSourceRow> {
    let config = serde_json::to_value(source.config()).map_err(SourceRepositoryError::persistence)?;
    Ok(TaskSourceRow {
        id: source.id().into_inner(),
        project_id: source.project_id().into_inner(),
        name: source.name().to_owned(),
        kind: source.kind().as_str().to_owned(),
        config,
        enabled: source.is_enabled(),
        sync_status: source.sync_status().as_str().to_owned(),
        sync_started_at: source.sync_started_at(),
        last_synced_at: source.last_synced_at(),
        created_at: source.created_at(),
        updated_at: source.updated_at(),
    })
}

pub(super) fn row_to_source(row: TaskSourceRow) -> SourceRepositoryResult<TaskSource> {
    let TaskSourceRow {
        id,
        project_id,
        name,
        config: persisted_config,
        enabled,
        sync_status: persisted_status,
        sync_started_at,
        last_synced_at,
        created_at,
        updated_at,
        ..
    } = row;

    let config = serde_json::from_value::<SourceConfig>(persisted_config)
        .map_err(SourceRepositoryError::persistence)?;
    let sync_status = SyncStatus::try_from(persisted_status.as_str())
        .map_err(SourceRepositoryError::persistence)?;

    Ok(TaskSource::from_persisted(PersistedTaskSourceData {
        id: TaskSourceId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        name,
        config,
        enabled,
        sync_status,
        sync_started_at,
        last_synced_at,
        created_at,
        updated_at,
    }))
}
