//! Lock keys, holders, and leases for per-issue work claims.

use super::SyncDomainError;
use crate::task::domain::IssueKey;
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Identity of the work being claimed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockKey(String);

impl LockKey {
    /// Creates a key from a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`SyncDomainError::EmptyLockKey`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, SyncDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(SyncDomainError::EmptyLockKey);
        }
        Ok(Self(raw))
    }

    /// Key guarding task creation for an external issue.
    #[must_use]
    pub fn for_issue(key: &IssueKey) -> Self {
        Self(key.to_string())
    }

    /// Returns the key as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a lock claimant, normally one worker process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HolderId(String);

impl HolderId {
    /// Creates a holder id from a configured value.
    ///
    /// # Errors
    ///
    /// Returns [`SyncDomainError::EmptyHolderId`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, SyncDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SyncDomainError::EmptyHolderId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generates a unique `sync-worker-<uuid>` holder id.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("sync-worker-{}", Uuid::new_v4()))
    }

    /// Returns the holder id as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A live or expired claim on a lock key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLease {
    key: LockKey,
    holder: HolderId,
    acquired_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl WorkLease {
    /// Creates a lease starting at `acquired_at`.
    #[must_use]
    pub fn new(
        key: LockKey,
        holder: HolderId,
        acquired_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            key,
            holder,
            acquired_at,
            expires_at: lease_expiry(acquired_at, duration),
        }
    }

    /// Returns the claimed key.
    #[must_use]
    pub const fn key(&self) -> &LockKey {
        &self.key
    }

    /// Returns the claimant.
    #[must_use]
    pub const fn holder(&self) -> &HolderId {
        &self.holder
    }

    /// Returns when the lease was acquired.
    #[must_use]
    pub const fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// Returns when the lease stops protecting the key.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns whether the lease still holds at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Returns whether `holder` owns this lease.
    #[must_use]
    pub fn is_held_by(&self, holder: &HolderId) -> bool {
        &self.holder == holder
    }

    /// Pushes the expiry to `duration` after `now`.
    pub fn extend(&mut self, now: DateTime<Utc>, duration: Duration) {
        self.expires_at = lease_expiry(now, duration);
    }
}

/// Computes a lease expiry, saturating at the largest representable instant.
#[must_use]
pub fn lease_expiry(start: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(duration)
        .ok()
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
