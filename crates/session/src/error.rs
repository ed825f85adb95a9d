use newsdesk_client::ApiError;
use newsdesk_core::error::CoreError;

use crate::state::SessionPhase;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid session request: {0}")]
    Invalid(#[from] CoreError),

    #[error("Failed to load article: {0}")]
    Load(#[source] ApiError),

    #[error("Authentication expired: {0}")]
    AuthExpired(#[source] ApiError),

    #[error("You do not own the lock for this article")]
    NotLockOwner,

    #[error("Failed to save article: {0}")]
    Save(#[source] ApiError),

    #[error("Session is not editing (phase: {0:?})")]
    NotEditing(SessionPhase),

    #[error("There are unsaved changes; confirm to leave")]
    UnsavedChanges,
}
