//! `PostgreSQL` adapters for task sources and projects.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresProjectRepository, PostgresTaskSourceRepository};
