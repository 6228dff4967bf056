//! Event publishers that keep events in process.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

use crate::sync::{
    domain::DownstreamEvent,
    ports::{EventPublisher, PublishError},
};

/// Publisher recording every event, optionally refusing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventPublisher {
    events: Arc<RwLock<Vec<DownstreamEvent>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingEventPublisher {
    /// Creates a publisher that accepts every event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a publisher that rejects every event.
    #[must_use]
    pub fn failing() -> Self {
        let publisher = Self::default();
        publisher.set_failing(true);
        publisher
    }

    /// Switches between accepting and rejecting events.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the accepted events in publish order.
    #[must_use]
    pub fn events(&self) -> Vec<DownstreamEvent> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: &DownstreamEvent) -> Result<(), PublishError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Rejected(format!(
                "{} for task {} refused",
                event.kind(),
                event.task_id()
            )));
        }
        let mut events = self
            .events
            .write()
            .map_err(|err| PublishError::Rejected(err.to_string()))?;
        events.push(event.clone());
        Ok(())
    }
}

/// Publisher forwarding events into a bounded Tokio channel.
///
/// Publishing never waits: a full buffer drops the event with
/// [`PublishError::Full`].
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    sender: mpsc::Sender<DownstreamEvent>,
}

impl ChannelEventPublisher {
    /// Creates a publisher and the receiver draining it. A zero capacity is
    /// treated as one.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DownstreamEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventPublisher for ChannelEventPublisher {
    async fn publish(&self, event: &DownstreamEvent) -> Result<(), PublishError> {
        self.sender
            .try_send(event.clone())
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => PublishError::Full,
                mpsc::error::TrySendError::Closed(_) => PublishError::Closed,
            })
    }
}
