//! In-memory adapters for task sources, projects, and credentials.

mod credentials;
mod repository;

pub use credentials::{PlaintextCredentialResolver, StaticCredentialResolver};
pub use repository::{InMemoryProjectRepository, InMemoryTaskSourceRepository};
