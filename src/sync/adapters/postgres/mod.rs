//! `PostgreSQL` adapters for sync state and work locks.

mod models;
mod schema;
mod state_store;
mod work_lock;

pub use state_store::PostgresSyncStateStore;
pub use work_lock::PostgresWorkLock;
