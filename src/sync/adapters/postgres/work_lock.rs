//! `PostgreSQL` work lock.
//!
//! Acquisition is one conditional upsert:
//!
//! ```sql
//! INSERT INTO work_locks (lock_key, holder_id, acquired_at, expires_at)
//! VALUES ($1, $2, $3, $4)
//! ON CONFLICT (lock_key) DO UPDATE
//!   SET holder_id = EXCLUDED.holder_id,
//!       acquired_at = EXCLUDED.acquired_at,
//!       expires_at = EXCLUDED.expires_at
//!   WHERE work_locks.expires_at <= EXCLUDED.acquired_at
//! ```
//!
//! One affected row means the caller now holds the lease.

use super::schema::work_locks;
use crate::pg::{PgPool, run_blocking};
use crate::sync::{
    domain::{HolderId, LockKey, lease_expiry},
    ports::{WorkLock, WorkLockError, WorkLockResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{Text, Timestamptz};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;

const ACQUIRE_SQL: &str = "INSERT INTO work_locks (lock_key, holder_id, acquired_at, expires_at) \
     VALUES ($1, $2, $3, $4) \
     ON CONFLICT (lock_key) DO UPDATE \
     SET holder_id = EXCLUDED.holder_id, \
         acquired_at = EXCLUDED.acquired_at, \
         expires_at = EXCLUDED.expires_at \
     WHERE work_locks.expires_at <= EXCLUDED.acquired_at";

/// Binds the conditional acquire statement.
fn acquire_statement(
    lock_key: String,
    holder_id: String,
    acquired_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    diesel::sql_query(ACQUIRE_SQL)
        .into_boxed::<Pg>()
        .bind::<Text, _>(lock_key)
        .bind::<Text, _>(holder_id)
        .bind::<Timestamptz, _>(acquired_at)
        .bind::<Timestamptz, _>(expires_at)
}

/// `PostgreSQL`-backed work lock.
///
/// Lease times come from the injected clock rather than the database clock,
/// so every worker sharing the table must run with synchronized clocks.
#[derive(Debug, Clone)]
pub struct PostgresWorkLock<C>
where
    C: Clock + Send + Sync,
{
    pool: PgPool,
    clock: Arc<C>,
}

impl<C> PostgresWorkLock<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a lock backed by a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool, clock: Arc<C>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl<C> WorkLock for PostgresWorkLock<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn try_acquire(
        &self,
        key: &LockKey,
        holder: &HolderId,
        lease: Duration,
    ) -> WorkLockResult<bool> {
        let now = self.clock.utc();
        let expires_at = lease_expiry(now, lease);
        let lock_key = key.as_str().to_owned();
        let holder_id = holder.as_str().to_owned();
        run_blocking(
            &self.pool,
            WorkLockError::persistence_boxed,
            move |connection| {
                let affected = acquire_statement(lock_key, holder_id, now, expires_at)
                    .execute(connection)
                    .map_err(WorkLockError::persistence)?;
                Ok(affected == 1)
            },
        )
        .await
    }

    async fn release(&self, key: &LockKey, holder: &HolderId) -> WorkLockResult<bool> {
        let lock_key = key.as_str().to_owned();
        let holder_id = holder.as_str().to_owned();
        run_blocking(
            &self.pool,
            WorkLockError::persistence_boxed,
            move |connection| {
                let deleted = diesel::delete(
                    work_locks::table
                        .filter(work_locks::lock_key.eq(&lock_key))
                        .filter(work_locks::holder_id.eq(&holder_id)),
                )
                .execute(connection)
                .map_err(WorkLockError::persistence)?;
                Ok(deleted > 0)
            },
        )
        .await
    }

    async fn is_locked(&self, key: &LockKey) -> WorkLockResult<bool> {
        let now = self.clock.utc();
        let lock_key = key.as_str().to_owned();
        run_blocking(
            &self.pool,
            WorkLockError::persistence_boxed,
            move |connection| {
                diesel::select(exists(
                    work_locks::table
                        .filter(work_locks::lock_key.eq(&lock_key))
                        .filter(work_locks::expires_at.gt(now)),
                ))
                .get_result::<bool>(connection)
                .map_err(WorkLockError::persistence)
            },
        )
        .await
    }

    async fn renew(
        &self,
        key: &LockKey,
        holder: &HolderId,
        lease: Duration,
    ) -> WorkLockResult<bool> {
        let now = self.clock.utc();
        let expires_at = lease_expiry(now, lease);
        let lock_key = key.as_str().to_owned();
        let holder_id = holder.as_str().to_owned();
        run_blocking(
            &self.pool,
            WorkLockError::persistence_boxed,
            move |connection| {
                let updated = diesel::update(
                    work_locks::table
                        .filter(work_locks::lock_key.eq(&lock_key))
                        .filter(work_locks::holder_id.eq(&holder_id))
                        .filter(work_locks::expires_at.gt(now)),
                )
                .set(work_locks::expires_at.eq(expires_at))
                .execute(connection)
                .map_err(WorkLockError::persistence)?;
                Ok(updated == 1)
            },
        )
        .await
    }
}
