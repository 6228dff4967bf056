//! Application services for turning fetched issues into tasks.

mod upsert;

pub use upsert::{TaskUpsertError, TaskUpsertResult, TaskUpsertService, TaskUpserter, UpsertedTask};
