//! Tracker connectors.
//!
//! A connector turns one tracker's issue list into a lazy stream of
//! [`SourceIssue`](crate::task::domain::SourceIssue) values. Callers pick the
//! adapter once through a [`ConnectorFactory`] and never branch on the
//! provider themselves.

pub mod adapters;
mod error;
mod http;
mod ports;

pub use error::{ConnectorError, ConnectorResult, parse_retry_after};
pub use http::{DEFAULT_HTTP_TIMEOUT, HttpSettings};
pub use ports::{ConnectorFactory, IssueConnector, IssueStream};

#[cfg(test)]
mod tests;
