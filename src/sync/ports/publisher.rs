//! Port for handing events to downstream consumers.

use crate::sync::domain::DownstreamEvent;
use async_trait::async_trait;
use thiserror::Error;

/// Fire-and-forget publisher with at-least-once delivery.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one event.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the event could not be handed over.
    async fn publish(&self, event: &DownstreamEvent) -> Result<(), PublishError>;
}

/// Errors returned by event publishers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    /// The receiving side has shut down.
    #[error("event channel is closed")]
    Closed,

    /// The buffer is full; the event was dropped rather than waited on.
    #[error("event buffer is full")]
    Full,

    /// The transport refused the event.
    #[error("event rejected: {0}")]
    Rejected(String),
}
