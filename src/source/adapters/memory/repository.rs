//! In-memory source and project repositories for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::source::{
    domain::{Project, ProjectId, SyncStatusUpdate, TaskSource, TaskSourceId},
    ports::{ProjectRepository, SourceRepositoryError, SourceRepositoryResult, TaskSourceRepository},
};

/// Thread-safe in-memory task source repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskSourceRepository {
    sources: Arc<RwLock<HashMap<TaskSourceId, TaskSource>>>,
}

impl InMemoryTaskSourceRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl ToString) -> SourceRepositoryError {
    SourceRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskSourceRepository for InMemoryTaskSourceRepository {
    async fn store(&self, source: &TaskSource) -> SourceRepositoryResult<()> {
        let mut sources = self.sources.write().map_err(poisoned)?;
        if sources.contains_key(&source.id()) {
            return Err(SourceRepositoryError::DuplicateSource(source.id()));
        }
        sources.insert(source.id(), source.clone());
        Ok(())
    }

    async fn update(&self, source: &TaskSource) -> SourceRepositoryResult<()> {
        let mut sources = self.sources.write().map_err(poisoned)?;
        let slot = sources
            .get_mut(&source.id())
            .ok_or(SourceRepositoryError::SourceNotFound(source.id()))?;
        *slot = source.clone();
        Ok(())
    }

    async fn update_sync_status(
        &self,
        id: TaskSourceId,
        update: SyncStatusUpdate,
    ) -> SourceRepositoryResult<()> {
        let mut sources = self.sources.write().map_err(poisoned)?;
        let slot = sources
            .get_mut(&id)
            .ok_or(SourceRepositoryError::SourceNotFound(id))?;
        slot.apply_sync_status_update(update);
        Ok(())
    }

    async fn find_by_id(&self, id: TaskSourceId) -> SourceRepositoryResult<Option<TaskSource>> {
        let sources = self.sources.read().map_err(poisoned)?;
        Ok(sources.get(&id).cloned())
    }
}

/// Thread-safe in-memory project repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<HashMap<ProjectId, Project>>>,
}

impl InMemoryProjectRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn store(&self, project: &Project) -> SourceRepositoryResult<()> {
        let mut projects = self.projects.write().map_err(poisoned)?;
        if projects.contains_key(&project.id()) {
            return Err(SourceRepositoryError::DuplicateProject(project.id()));
        }
        projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> SourceRepositoryResult<()> {
        let mut projects = self.projects.write().map_err(poisoned)?;
        let slot = projects
            .get_mut(&project.id())
            .ok_or(SourceRepositoryError::ProjectNotFound(project.id()))?;
        *slot = project.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> SourceRepositoryResult<Option<Project>> {
        let projects = self.projects.read().map_err(poisoned)?;
        Ok(projects.get(&id).cloned())
    }
}
