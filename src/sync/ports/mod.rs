//! Port contracts for sync state, work locks, and event publishing.

pub mod publisher;
pub mod state_store;
pub mod work_lock;

pub use publisher::{EventPublisher, PublishError};
pub use state_store::{SyncStateError, SyncStateResult, SyncStateStore};
pub use work_lock::{WorkLock, WorkLockError, WorkLockResult};
