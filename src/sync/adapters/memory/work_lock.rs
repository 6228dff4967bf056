//! In-memory work lock with clock-driven lease expiry.

use async_trait::async_trait;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::sync::{
    domain::{HolderId, LockKey, WorkLease},
    ports::{WorkLock, WorkLockError, WorkLockResult},
};

/// Work lock keeping leases in a mutex-guarded table.
///
/// Every operation runs under the one mutex, which makes acquisition a single
/// check-and-set.
#[derive(Debug, Clone)]
pub struct InMemoryWorkLock<C>
where
    C: Clock + Send + Sync,
{
    leases: Arc<Mutex<HashMap<LockKey, WorkLease>>>,
    clock: Arc<C>,
}

impl<C> InMemoryWorkLock<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty lock table evaluated against `clock`.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            leases: Arc::default(),
            clock,
        }
    }

    /// Returns the lease currently recorded for `key`, live or expired.
    ///
    /// # Errors
    ///
    /// Returns [`WorkLockError::Persistence`] when the mutex is poisoned.
    pub fn lease(&self, key: &LockKey) -> WorkLockResult<Option<WorkLease>> {
        let leases = self.leases.lock().map_err(poisoned)?;
        Ok(leases.get(key).cloned())
    }
}

fn poisoned(err: impl ToString) -> WorkLockError {
    WorkLockError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl<C> WorkLock for InMemoryWorkLock<C>
where
    C: Clock + Send + Sync,
{
    async fn try_acquire(
        &self,
        key: &LockKey,
        holder: &HolderId,
        lease: Duration,
    ) -> WorkLockResult<bool> {
        let now = self.clock.utc();
        let mut leases = self.leases.lock().map_err(poisoned)?;
        if leases.get(key).is_some_and(|existing| existing.is_live(now)) {
            return Ok(false);
        }
        leases.insert(
            key.clone(),
            WorkLease::new(key.clone(), holder.clone(), now, lease),
        );
        Ok(true)
    }

    async fn release(&self, key: &LockKey, holder: &HolderId) -> WorkLockResult<bool> {
        let mut leases = self.leases.lock().map_err(poisoned)?;
        if !leases.get(key).is_some_and(|existing| existing.is_held_by(holder)) {
            return Ok(false);
        }
        leases.remove(key);
        Ok(true)
    }

    async fn is_locked(&self, key: &LockKey) -> WorkLockResult<bool> {
        let now = self.clock.utc();
        let leases = self.leases.lock().map_err(poisoned)?;
        Ok(leases.get(key).is_some_and(|existing| existing.is_live(now)))
    }

    async fn renew(
        &self,
        key: &LockKey,
        holder: &HolderId,
        lease: Duration,
    ) -> WorkLockResult<bool> {
        let now = self.clock.utc();
        let mut leases = self.leases.lock().map_err(poisoned)?;
        match leases.get_mut(key) {
            Some(existing) if existing.is_held_by(holder) && existing.is_live(now) => {
                existing.extend(now, lease);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
