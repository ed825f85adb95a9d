//! How a session reports to its UI collaborator.
//!
//! The observer is handed to [`EditSession::open`](crate::EditSession::open)
//! and is the only channel through which a session interrupts the user.

use newsdesk_core::types::{AdminId, ArticleId};

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// Explicit save succeeded.
    Saved,
    /// The user cancelled editing.
    Cancelled,
    /// The user navigated away (after confirming, if the draft was dirty).
    NavigatedAway,
    /// The heartbeat found the lock released or held by someone else.
    LockLost { owner_id: Option<AdminId> },
    /// The storage API refused a save because this session does not own the
    /// lock. The edit was not persisted.
    OwnershipLost,
    /// The API rejected the bearer credential. Re-authentication required.
    AuthExpired,
    /// The article could not be loaded.
    LoadFailed,
    /// The session was dropped without an explicit exit.
    Closed,
}

impl ExitReason {
    /// Exits the user must acknowledge before the editor navigates away.
    pub fn requires_acknowledgement(&self) -> bool {
        matches!(
            self,
            ExitReason::LockLost { .. } | ExitReason::OwnershipLost | ExitReason::AuthExpired
        )
    }
}

/// A finished session, as reported to the observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionExit {
    pub article_id: ArticleId,
    pub reason: ExitReason,
    /// User-facing explanation.
    pub message: String,
}

/// Non-fatal conditions the user should see while the session continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// Another admin holds the lock; the session is read-only in practice.
    LockConflict {
        owner_id: Option<AdminId>,
        reason: String,
    },
    /// The lock could not be requested (network trouble). Saves may be
    /// rejected.
    LockUnavailable { reason: String },
    /// An explicit save failed for a retryable reason.
    SaveFailed { reason: String },
}

impl SessionNotice {
    pub fn message(&self) -> String {
        match self {
            SessionNotice::LockConflict { owner_id, reason } => match owner_id {
                Some(owner) => format!(
                    "Warning: {reason} (held by {owner}). You can view the article but editing may be restricted."
                ),
                None => format!(
                    "Warning: {reason}. You can view the article but editing may be restricted."
                ),
            },
            SessionNotice::LockUnavailable { .. } => {
                "Warning: Failed to lock article. You can view the article but editing may be restricted."
                    .to_string()
            }
            SessionNotice::SaveFailed { reason } => {
                format!("Failed to update article: {reason}. Please try again.")
            }
        }
    }
}

/// Receives session exits and notices.
///
/// Callbacks run on the task that detected the condition (possibly a timer
/// task) and must not block for long.
pub trait SessionObserver: Send + Sync {
    /// The session ended. Called exactly once per session.
    fn on_exit(&self, exit: &SessionExit);

    /// A non-fatal condition occurred.
    fn on_notice(&self, _notice: &SessionNotice) {}
}
