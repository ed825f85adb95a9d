//! State and collaborators shared by a session and its timer tasks.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use newsdesk_client::{ApiError, ArticleStore, LockClient, ReleaseOutcome};
use newsdesk_core::lock::LockState;
use newsdesk_core::types::{AdminId, ArticleId};

use crate::config::SessionConfig;
use crate::observer::{ExitReason, SessionExit, SessionNotice, SessionObserver};
use crate::state::{SessionPhase, SessionState};

pub(crate) const LOCK_LOST_MESSAGE: &str =
    "Your editing session has expired. The article lock has been released.";
pub(crate) const OWNERSHIP_LOST_MESSAGE: &str =
    "You do not own the lock for this article. Your changes were not saved.";
pub(crate) const AUTH_EXPIRED_MESSAGE: &str =
    "Your login has expired. Please sign in again.";

pub(crate) struct SessionContext {
    pub article_id: ArticleId,
    pub owner_id: AdminId,
    pub locks: Arc<dyn LockClient>,
    pub store: Arc<dyn ArticleStore>,
    pub observer: Arc<dyn SessionObserver>,
    pub config: SessionConfig,
    pub state: RwLock<SessionState>,
    /// Held for the duration of every article update. Autosave skips a tick
    /// when it is taken; an explicit save waits for it.
    pub persist_gate: Mutex<()>,
}

impl SessionContext {
    /// Enter `Exited(reason)` unless the session already exited. Returns
    /// whether the lock was still held at that point.
    pub async fn begin_exit(&self, reason: &ExitReason) -> Option<bool> {
        let mut state = self.state.write().await;
        if state.phase.is_exited() {
            return None;
        }
        state.phase = SessionPhase::Exited(reason.clone());
        Some(state.lock.held)
    }

    pub fn announce_exit(&self, reason: ExitReason, message: &str) {
        tracing::info!(article_id = %self.article_id, ?reason, "Edit session ended");
        self.observer.on_exit(&SessionExit {
            article_id: self.article_id.clone(),
            reason,
            message: message.to_string(),
        });
    }

    /// Enter `Exited(reason)` and notify the observer. Returns `false` if
    /// the session had already exited.
    pub async fn finish(&self, reason: ExitReason, message: &str) -> bool {
        if self.begin_exit(&reason).await.is_none() {
            return false;
        }
        self.announce_exit(reason, message);
        true
    }

    /// End a locked editing session from a timer task.
    ///
    /// Cancels `lease` (stopping both timers) before the state changes, so
    /// no further tick can observe the exited session. A result arriving
    /// after the session left `Editing { locked: true }` is ignored and
    /// `false` is returned.
    pub async fn force_exit(
        &self,
        lease: &CancellationToken,
        reason: ExitReason,
        message: &str,
    ) -> bool {
        {
            let mut state = self.state.write().await;
            if !state.phase.is_editing_locked() {
                tracing::debug!(
                    article_id = %self.article_id,
                    phase = ?state.phase,
                    "Ignoring late timer result"
                );
                return false;
            }

            lease.cancel();
            state.lock = match &reason {
                ExitReason::LockLost {
                    owner_id: Some(owner),
                } => LockState::conflicted(Some(owner.clone())),
                _ => LockState::released(),
            };
            state.phase = SessionPhase::Exited(reason.clone());
        }

        tracing::warn!(article_id = %self.article_id, ?reason, "Edit session forcibly ended");
        self.announce_exit(reason, message);
        true
    }

    /// Release the lock, bounded by the release timeout. The local lock
    /// state is cleared whatever the outcome.
    ///
    /// Only an auth failure is returned; every other failure is logged.
    pub async fn release_lock(&self) -> Result<(), ApiError> {
        let release = self.locks.release(&self.article_id);
        let result = match tokio::time::timeout(self.config.release_timeout, release).await {
            Ok(Ok(ReleaseOutcome::Released)) => {
                tracing::info!(article_id = %self.article_id, "Article lock released");
                Ok(())
            }
            Ok(Ok(ReleaseOutcome::NotHeld(message))) => {
                tracing::debug!(article_id = %self.article_id, %message, "Lock was not held");
                Ok(())
            }
            Ok(Err(e)) if e.is_auth_failure() => {
                tracing::warn!(article_id = %self.article_id, error = %e, "Lock release unauthorized");
                Err(e)
            }
            Ok(Err(e)) => {
                tracing::warn!(article_id = %self.article_id, error = %e, "Failed to release lock");
                Ok(())
            }
            Err(_) => {
                tracing::warn!(
                    article_id = %self.article_id,
                    timeout_secs = self.config.release_timeout.as_secs(),
                    "Lock release timed out"
                );
                Ok(())
            }
        };

        self.state.write().await.lock = LockState::released();
        result
    }

    pub fn notify(&self, notice: SessionNotice) {
        self.observer.on_notice(&notice);
    }

    pub async fn mark_saved(&self, revision: u64) {
        let mut state = self.state.write().await;
        if state.revision == revision {
            state.dirty = false;
        }
        state.last_saved = Some(Utc::now());
    }
}
