//! Domain model for task sources and projects.

mod config;
mod credential;
mod error;
mod ids;
mod kind;
mod project;
mod task_source;

pub use config::{GitHubSourceConfig, GitLabSourceConfig, JiraSourceConfig, SourceConfig};
pub use credential::{EncryptedCredential, SecretToken};
pub use error::{ParseSourceKindError, ParseSyncStatusError, SourceDomainError};
pub use ids::{ProjectId, TaskSourceId};
pub use kind::SourceKind;
pub use project::Project;
pub use task_source::{PersistedTaskSourceData, SyncStatus, SyncStatusUpdate, TaskSource};
