use std::time::Duration;

use newsdesk_core::lock::{
    AUTOSAVE_INTERVAL_SECS, DEFAULT_MAX_HEARTBEAT_FAILURES, HEARTBEAT_INTERVAL_SECS,
    LOCK_RELEASE_TIMEOUT_SECS, LOCK_STATUS_TIMEOUT_SECS,
};

/// Timing and failure-tolerance settings for an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Period between lock-status checks while the lock is held.
    pub heartbeat_interval: Duration,
    /// Period between autosave checks while the lock is held.
    pub autosave_interval: Duration,
    /// Upper bound on one lock-status query. A query that exceeds it counts
    /// as a transient failure.
    pub status_timeout: Duration,
    /// Upper bound on the best-effort release during teardown.
    pub release_timeout: Duration,
    /// Consecutive transient heartbeat failures after which the lock is
    /// assumed lost. `0` never assumes loss.
    pub max_heartbeat_failures: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(HEARTBEAT_INTERVAL_SECS),
            autosave_interval: Duration::from_secs(AUTOSAVE_INTERVAL_SECS),
            status_timeout: Duration::from_secs(LOCK_STATUS_TIMEOUT_SECS),
            release_timeout: Duration::from_secs(LOCK_RELEASE_TIMEOUT_SECS),
            max_heartbeat_failures: DEFAULT_MAX_HEARTBEAT_FAILURES,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `HEARTBEAT_INTERVAL_SECS`   | `30`    |
    /// | `AUTOSAVE_INTERVAL_SECS`    | `60`    |
    /// | `LOCK_STATUS_TIMEOUT_SECS`  | `10`    |
    /// | `LOCK_RELEASE_TIMEOUT_SECS` | `5`     |
    /// | `HEARTBEAT_MAX_FAILURES`    | `5`     |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            heartbeat_interval: env_secs("HEARTBEAT_INTERVAL_SECS")
                .unwrap_or(defaults.heartbeat_interval),
            autosave_interval: env_secs("AUTOSAVE_INTERVAL_SECS")
                .unwrap_or(defaults.autosave_interval),
            status_timeout: env_secs("LOCK_STATUS_TIMEOUT_SECS")
                .unwrap_or(defaults.status_timeout),
            release_timeout: env_secs("LOCK_RELEASE_TIMEOUT_SECS")
                .unwrap_or(defaults.release_timeout),
            max_heartbeat_failures: std::env::var("HEARTBEAT_MAX_FAILURES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_heartbeat_failures),
        }
    }
}

/// Read a positive number of seconds from `key`. Zero or unparsable values
/// are ignored so a typo cannot produce a zero-period timer.
fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
