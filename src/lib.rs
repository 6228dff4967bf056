//! Tracksync: tracker issue ingestion into internal tasks.
//!
//! The crate pulls issues from GitLab, GitHub and Jira, turns new and changed
//! ones into tasks, and requests a downstream evaluation for every task it
//! creates. Repeated runs are incremental and concurrent runs never create the
//! same task twice.
//!
//! # Architecture
//!
//! Tracksync follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP, memory)
//!
//! # Modules
//!
//! - [`source`]: Task sources, projects, and sync status
//! - [`task`]: Issue snapshots and task create-or-update
//! - [`connector`]: Paginated issue fetching per tracker
//! - [`sync`]: Sync state, work locks, and the sync orchestrator
//! - [`pg`]: Shared `PostgreSQL` pool helpers

pub mod connector;
pub mod pg;
pub mod source;
pub mod sync;
pub mod task;
