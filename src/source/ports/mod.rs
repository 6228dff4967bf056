//! Port contracts for task sources, projects, and credentials.

pub mod credentials;
pub mod repository;

pub use credentials::{CredentialError, CredentialResolver};
pub use repository::{
    ProjectRepository, SourceRepositoryError, SourceRepositoryResult, TaskSourceRepository,
};
