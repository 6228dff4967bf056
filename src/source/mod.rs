//! Task source configuration and ownership.
//!
//! A task source is one configured connection from a project to an external
//! issue tracker. This module owns the source and project records, the
//! credential-resolution seam used by connectors, and the repositories the
//! sync orchestrator reads and mutates. It follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
