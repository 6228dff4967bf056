//! Application services for syncing task sources.

mod orchestrator;

pub use orchestrator::{SyncOrchestrator, SyncPorts};
