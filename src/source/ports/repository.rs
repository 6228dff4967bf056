//! Repository ports for task sources and projects.

use crate::source::domain::{Project, ProjectId, SyncStatusUpdate, TaskSource, TaskSourceId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for source and project repository operations.
pub type SourceRepositoryResult<T> = Result<T, SourceRepositoryError>;

/// Task source persistence contract.
#[async_trait]
pub trait TaskSourceRepository: Send + Sync {
    /// Stores a new task source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceRepositoryError::DuplicateSource`] when the identifier
    /// already exists.
    async fn store(&self, source: &TaskSource) -> SourceRepositoryResult<()>;

    /// Persists status, configuration, and enablement changes.
    ///
    /// # Errors
    ///
    /// Returns [`SourceRepositoryError::SourceNotFound`] when the source does
    /// not exist.
    async fn update(&self, source: &TaskSource) -> SourceRepositoryResult<()>;

    /// Writes only the sync status fields of a source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceRepositoryError::SourceNotFound`] when the source does
    /// not exist.
    async fn update_sync_status(
        &self,
        id: TaskSourceId,
        update: SyncStatusUpdate,
    ) -> SourceRepositoryResult<()>;

    /// Finds a task source by identifier.
    ///
    /// Returns `None` when the source does not exist.
    async fn find_by_id(&self, id: TaskSourceId) -> SourceRepositoryResult<Option<TaskSource>>;
}

/// Project lookup contract.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`SourceRepositoryError::DuplicateProject`] when the identifier
    /// already exists.
    async fn store(&self, project: &Project) -> SourceRepositoryResult<()>;

    /// Persists enablement changes.
    ///
    /// # Errors
    ///
    /// Returns [`SourceRepositoryError::ProjectNotFound`] when the project
    /// does not exist.
    async fn update(&self, project: &Project) -> SourceRepositoryResult<()>;

    /// Finds a project by identifier.
    ///
    /// Returns `None` when the project does not exist.
    async fn find_by_id(&self, id: ProjectId) -> SourceRepositoryResult<Option<Project>>;
}

/// Errors returned by source and project repository implementations.
#[derive(Debug, Clone, Error)]
pub enum SourceRepositoryError {
    /// A task source with the same identifier already exists.
    #[error("duplicate task source identifier: {0}")]
    DuplicateSource(TaskSourceId),

    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// The task source was not found.
    #[error("task source not found: {0}")]
    SourceNotFound(TaskSourceId),

    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SourceRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps an already boxed persistence error.
    #[must_use]
    pub fn persistence_boxed(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Persistence(Arc::from(err))
    }
}
