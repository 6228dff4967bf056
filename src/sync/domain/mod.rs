//! Sync domain: recorded state, work leases, run results, and events.

mod error;
mod event;
mod lease;
mod run;
mod settings;
mod state;

pub use error::SyncDomainError;
pub use event::DownstreamEvent;
pub use lease::{HolderId, LockKey, WorkLease, lease_expiry};
pub use run::{SyncErrorKind, SyncRequest, SyncRunError, SyncRunResult};
pub use settings::{ConfigError, DEFAULT_LEASE_DURATION, DEFAULT_STALE_SYNC_AFTER, SyncConfig};
pub use state::{IssueChange, SyncStateEntry, SyncStateSnapshot};
