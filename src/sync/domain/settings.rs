//! Worker configuration for sync runs.

use super::{HolderId, SyncDomainError};
use config::{Config, Environment};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default lease on a per-issue work lock.
pub const DEFAULT_LEASE_DURATION: Duration = Duration::from_secs(30);

/// Default age after which a `syncing` status is reported as stale.
pub const DEFAULT_STALE_SYNC_AFTER: Duration = Duration::from_secs(15 * 60);

const ENV_PREFIX: &str = "TRACKSYNC";

/// Errors raised while loading [`SyncConfig`].
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration sources could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(Arc<config::ConfigError>),

    /// A duration setting was zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// The worker id was blank.
    #[error(transparent)]
    WorkerId(#[from] SyncDomainError),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        Self::Load(Arc::new(err))
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSyncConfig {
    worker_id: Option<String>,
    lease_seconds: Option<u64>,
    stale_sync_seconds: Option<u64>,
}

/// Settings shared by every run a worker performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    worker_id: HolderId,
    lease_duration: Duration,
    stale_sync_after: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            worker_id: HolderId::generate(),
            lease_duration: DEFAULT_LEASE_DURATION,
            stale_sync_after: DEFAULT_STALE_SYNC_AFTER,
        }
    }
}

impl SyncConfig {
    /// Loads overrides from `TRACKSYNC_WORKER_ID`, `TRACKSYNC_LEASE_SECONDS`
    /// and `TRACKSYNC_STALE_SYNC_SECONDS`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable cannot be parsed or holds an
    /// invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads overrides from explicit `TRACKSYNC_*` variables instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] under the same conditions as
    /// [`SyncConfig::from_env`].
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::from_environment(Environment::with_prefix(ENV_PREFIX).source(Some(source)))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let raw: RawSyncConfig = Config::builder()
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()?;

        let mut resolved = Self::default();
        if let Some(worker_id) = raw.worker_id {
            resolved.worker_id = HolderId::new(worker_id)?;
        }
        if let Some(seconds) = raw.lease_seconds {
            resolved.lease_duration = non_zero_seconds("TRACKSYNC_LEASE_SECONDS", seconds)?;
        }
        if let Some(seconds) = raw.stale_sync_seconds {
            resolved.stale_sync_after = non_zero_seconds("TRACKSYNC_STALE_SYNC_SECONDS", seconds)?;
        }
        Ok(resolved)
    }

    /// Sets the lock holder id.
    #[must_use]
    pub fn with_worker_id(mut self, worker_id: HolderId) -> Self {
        self.worker_id = worker_id;
        self
    }

    /// Sets the work lock lease.
    #[must_use]
    pub const fn with_lease_duration(mut self, lease_duration: Duration) -> Self {
        self.lease_duration = lease_duration;
        self
    }

    /// Sets the stale `syncing` threshold.
    #[must_use]
    pub const fn with_stale_sync_after(mut self, stale_sync_after: Duration) -> Self {
        self.stale_sync_after = stale_sync_after;
        self
    }

    /// Returns the lock holder id.
    #[must_use]
    pub const fn worker_id(&self) -> &HolderId {
        &self.worker_id
    }

    /// Returns the work lock lease.
    #[must_use]
    pub const fn lease_duration(&self) -> Duration {
        self.lease_duration
    }

    /// Returns the stale `syncing` threshold.
    #[must_use]
    pub const fn stale_sync_after(&self) -> Duration {
        self.stale_sync_after
    }
}

fn non_zero_seconds(key: &'static str, seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::ZeroDuration(key));
    }
    Ok(Duration::from_secs(seconds))
}
