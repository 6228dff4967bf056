//! In-memory adapters for sync state, work locks, and event publishing.

mod publisher;
mod state_store;
mod work_lock;

pub use publisher::{ChannelEventPublisher, RecordingEventPublisher};
pub use state_store::InMemorySyncStateStore;
pub use work_lock::InMemoryWorkLock;
