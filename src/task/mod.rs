//! Tasks created from external tracker issues.
//!
//! This module maps normalized issues onto the internal task schema and
//! performs the idempotent create-or-update keyed by provider and external
//! issue id. Workflow status after creation is owned elsewhere; refreshing a
//! task from a newer issue snapshot never touches it. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
