//! Project owning task sources and tasks.

use super::{ProjectId, SourceDomainError};
use serde::{Deserialize, Serialize};

/// Project record as seen by the sync core.
///
/// Only the identity, display name, and enablement flag matter here; the rest
/// of the project lives with its owning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    enabled: bool,
}

impl Project {
    /// Creates an enabled project.
    ///
    /// # Errors
    ///
    /// Returns [`SourceDomainError::EmptyProjectName`] when the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, SourceDomainError> {
        Self::with_id(ProjectId::new(), name)
    }

    /// Creates an enabled project with a known identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SourceDomainError::EmptyProjectName`] when the name is blank.
    pub fn with_id(id: ProjectId, name: impl Into<String>) -> Result<Self, SourceDomainError> {
        let raw = name.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(SourceDomainError::EmptyProjectName);
        }
        Ok(Self {
            id,
            name: normalized.to_owned(),
            enabled: true,
        })
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub const fn from_persisted(id: ProjectId, name: String, enabled: bool) -> Self {
        Self { id, name, enabled }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the project accepts new work.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disables the project.
    pub const fn disable(&mut self) {
        self.enabled = false;
    }

    /// Re-enables the project.
    pub const fn enable(&mut self) {
        self.enabled = true;
    }
}
