//! Article editing-lock constants and the client-side view of lock ownership.
//!
//! The lock itself lives on the server. [`LockState`] is what one edit
//! session currently believes, and [`LockStatus`] is what the server last
//! attested when asked.

use serde::{Deserialize, Serialize};

use crate::types::{AdminId, Timestamp};

// ---------------------------------------------------------------------------
// Timing constants
// ---------------------------------------------------------------------------

/// How often a lock holder re-validates ownership (in seconds).
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// How often a dirty draft is autosaved (in seconds).
pub const AUTOSAVE_INTERVAL_SECS: u64 = 60;

/// Upper bound on a single lock-status query (in seconds).
pub const LOCK_STATUS_TIMEOUT_SECS: u64 = 10;

/// Upper bound on the best-effort release during teardown (in seconds).
pub const LOCK_RELEASE_TIMEOUT_SECS: u64 = 5;

/// Consecutive failed status queries after which the lock is assumed lost.
/// Zero disables the pessimistic assumption.
pub const DEFAULT_MAX_HEARTBEAT_FAILURES: u32 = 5;

/// Message the storage API returns when an update comes from a non-holder.
pub const NOT_LOCK_OWNER_MESSAGE: &str = "You do not own the lock";

/// Returns `true` if a server message reports that the caller does not hold
/// the article lock.
pub fn is_not_owner_message(message: &str) -> bool {
    message
        .to_ascii_lowercase()
        .contains(&NOT_LOCK_OWNER_MESSAGE.to_ascii_lowercase())
}

// ---------------------------------------------------------------------------
// LockState
// ---------------------------------------------------------------------------

/// A session's view of lock ownership.
///
/// At most one of `held` and `acquiring` is true. `held == false` with an
/// `owner_id` means another admin holds the lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LockState {
    pub held: bool,
    pub acquiring: bool,
    pub owner_id: Option<AdminId>,
    pub acquired_at: Option<Timestamp>,
}

impl LockState {
    /// State at session start, before the acquire call returns.
    pub fn acquiring() -> Self {
        Self {
            acquiring: true,
            ..Default::default()
        }
    }

    /// This session holds the lock.
    pub fn held(owner_id: AdminId, acquired_at: Timestamp) -> Self {
        Self {
            held: true,
            acquiring: false,
            owner_id: Some(owner_id),
            acquired_at: Some(acquired_at),
        }
    }

    /// Another admin holds the lock (owner may be unknown).
    pub fn conflicted(owner_id: Option<AdminId>) -> Self {
        Self {
            owner_id,
            ..Default::default()
        }
    }

    /// No lock, no pending acquire.
    pub fn released() -> Self {
        Self::default()
    }

    /// Returns `true` if the lock is known to be held by someone else.
    pub fn is_locked_by_other(&self) -> bool {
        !self.held && !self.acquiring && self.owner_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// LockStatus
// ---------------------------------------------------------------------------

/// Server-attested lock status for one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockStatus {
    pub is_locked: bool,
    pub locked_by: Option<AdminId>,
}

impl LockStatus {
    /// Returns `true` if the article is locked and `owner` holds it.
    pub fn is_held_by(&self, owner: &str) -> bool {
        self.is_locked && self.locked_by.as_deref() == Some(owner)
    }
}
