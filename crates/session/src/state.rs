//! Session state shared between the controller and its timer tasks.

use newsdesk_core::article::EditableArticle;
use newsdesk_core::lock::LockState;
use newsdesk_core::types::Timestamp;

use crate::observer::ExitReason;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Locking,
    /// Fields are editable. `locked == false` means the lock could not be
    /// obtained and saves may be rejected.
    Editing { locked: bool },
    Saving,
    Exited(ExitReason),
}

impl SessionPhase {
    pub fn is_editing(&self) -> bool {
        matches!(self, SessionPhase::Editing { .. })
    }

    pub fn is_editing_locked(&self) -> bool {
        matches!(self, SessionPhase::Editing { locked: true })
    }

    pub fn is_exited(&self) -> bool {
        matches!(self, SessionPhase::Exited(_))
    }
}

/// Mutable state guarded by the session's lock.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub phase: SessionPhase,
    pub lock: LockState,
    pub draft: EditableArticle,
    pub dirty: bool,
    /// Incremented on every recorded edit. An autosave only clears `dirty`
    /// if no edit happened while it was in flight.
    pub revision: u64,
    pub last_saved: Option<Timestamp>,
}

impl SessionState {
    pub fn loading(article_id: &str) -> Self {
        Self {
            phase: SessionPhase::Loading,
            lock: LockState::released(),
            draft: EditableArticle {
                id: article_id.to_string(),
                ..Default::default()
            },
            dirty: false,
            revision: 0,
            last_saved: None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase.clone(),
            lock: self.lock.clone(),
            has_unsaved_changes: self.dirty,
            last_saved: self.last_saved,
            draft: self.draft.clone(),
        }
    }
}

/// Point-in-time copy of what the UI renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub lock: LockState,
    pub has_unsaved_changes: bool,
    pub last_saved: Option<Timestamp>,
    pub draft: EditableArticle,
}
