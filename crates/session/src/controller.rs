//! The edit session state machine.
//!
//! ```text
//! Loading -> Locking -> Editing { locked } -> Saving -> Exited(Saved)
//!                                  |            |
//!                                  |            +-> Editing (retryable failure)
//!                                  +-> Exited(Cancelled | NavigatedAway | LockLost | ...)
//! ```
//!
//! The heartbeat and autosave timers run only in `Editing { locked: true }`.
//! Every exit path stops both timers before the lock is released.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use newsdesk_client::{AcquireOutcome, ArticleStore, LockClient, NewsdeskApi};
use newsdesk_core::article::{validate_article_id, ArticleEdit, EditableArticle};
use newsdesk_core::last_saved::format_last_saved;
use newsdesk_core::lock::LockState;
use newsdesk_core::types::{AdminId, ArticleId, Timestamp};

use crate::autosave::Autosave;
use crate::config::SessionConfig;
use crate::context::{SessionContext, AUTH_EXPIRED_MESSAGE, OWNERSHIP_LOST_MESSAGE};
use crate::error::SessionError;
use crate::heartbeat::Heartbeat;
use crate::observer::{ExitReason, SessionNotice, SessionObserver};
use crate::state::{SessionPhase, SessionSnapshot, SessionState};
use crate::timer::{PeriodicTask, TimerState};

const UNSAVED_CHANGES_MESSAGE: &str =
    "You have unsaved changes. Are you sure you want to leave?";

/// The remote services a session talks to, plus the observer it reports to.
#[derive(Clone)]
pub struct Collaborators {
    pub locks: Arc<dyn LockClient>,
    pub store: Arc<dyn ArticleStore>,
    pub observer: Arc<dyn SessionObserver>,
}

impl Collaborators {
    /// Use one authenticated API client as both lock and article store.
    pub fn over_http(api: NewsdeskApi, observer: Arc<dyn SessionObserver>) -> Self {
        let api = Arc::new(api);
        Self {
            locks: api.clone(),
            store: api,
            observer,
        }
    }
}

/// Answer to "may the user navigate away right now?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationGuard {
    Allow,
    /// Leaving would discard unsaved changes to a held article.
    Confirm { message: String },
}

/// Both session timers and the token that parents them.
struct SessionTimers {
    lease: CancellationToken,
    heartbeat: PeriodicTask,
    autosave: PeriodicTask,
}

impl SessionTimers {
    fn new() -> Self {
        Self {
            lease: CancellationToken::new(),
            heartbeat: PeriodicTask::idle("heartbeat"),
            autosave: PeriodicTask::idle("autosave"),
        }
    }

    fn start(&mut self, ctx: &Arc<SessionContext>) {
        if self.lease.is_cancelled() {
            self.lease = CancellationToken::new();
        }

        self.heartbeat.start(
            ctx.config.heartbeat_interval,
            &self.lease,
            Heartbeat::new(ctx.clone(), self.lease.clone()),
        );
        self.autosave.start(
            ctx.config.autosave_interval,
            &self.lease,
            Autosave::new(ctx.clone(), self.lease.clone()),
        );
    }

    fn stop(&mut self) {
        self.lease.cancel();
        self.heartbeat.stop();
        self.autosave.stop();
    }
}

/// One admin editing one article.
///
/// Dropping a session without an explicit exit stops its timers and, if a
/// tokio runtime is available, releases the lock in the background.
pub struct EditSession {
    ctx: Arc<SessionContext>,
    timers: SessionTimers,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("article_id", &self.ctx.article_id)
            .field("owner_id", &self.ctx.owner_id)
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Load the article, then try to take its lock.
    ///
    /// Losing the lock race is not an error: the session opens in
    /// `Editing { locked: false }` and the observer receives a
    /// [`SessionNotice::LockConflict`]. Load failures end the session
    /// before any lock is requested.
    pub async fn open(
        article_id: impl Into<ArticleId>,
        owner_id: impl Into<AdminId>,
        collaborators: Collaborators,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let article_id = article_id.into();
        validate_article_id(&article_id)?;

        let ctx = Arc::new(SessionContext {
            state: RwLock::new(SessionState::loading(&article_id)),
            article_id,
            owner_id: owner_id.into(),
            locks: collaborators.locks,
            store: collaborators.store,
            observer: collaborators.observer,
            config,
            persist_gate: Mutex::new(()),
        });
        let mut session = Self {
            ctx,
            timers: SessionTimers::new(),
        };

        session.load().await?;
        session.acquire_lock().await?;
        Ok(session)
    }

    async fn load(&self) -> Result<(), SessionError> {
        let ctx = &self.ctx;
        tracing::debug!(article_id = %ctx.article_id, "Loading article");

        match ctx.store.fetch_article(&ctx.article_id).await {
            Ok(article) => {
                let mut state = ctx.state.write().await;
                state.draft = article;
                state.last_saved = Some(Utc::now());
                state.phase = SessionPhase::Locking;
                state.lock = LockState::acquiring();
                Ok(())
            }
            Err(e) if e.is_auth_failure() => {
                ctx.finish(ExitReason::AuthExpired, AUTH_EXPIRED_MESSAGE).await;
                Err(SessionError::AuthExpired(e))
            }
            Err(e) => {
                tracing::error!(article_id = %ctx.article_id, error = %e, "Failed to load article");
                ctx.finish(ExitReason::LoadFailed, "Failed to load article.")
                    .await;
                Err(SessionError::Load(e))
            }
        }
    }

    async fn acquire_lock(&mut self) -> Result<(), SessionError> {
        let outcome = self.ctx.locks.acquire(&self.ctx.article_id).await;
        let ctx = &self.ctx;

        match outcome {
            Ok(AcquireOutcome::Acquired) => {
                {
                    let mut state = ctx.state.write().await;
                    state.lock = LockState::held(ctx.owner_id.clone(), Utc::now());
                    state.phase = SessionPhase::Editing { locked: true };
                }
                tracing::info!(
                    article_id = %ctx.article_id,
                    owner_id = %ctx.owner_id,
                    "Article lock acquired"
                );
                self.timers.start(&self.ctx);
                Ok(())
            }
            Ok(AcquireOutcome::Conflict { owner_id, reason }) => {
                {
                    let mut state = ctx.state.write().await;
                    state.lock = LockState::conflicted(owner_id.clone());
                    state.phase = SessionPhase::Editing { locked: false };
                }
                tracing::warn!(
                    article_id = %ctx.article_id,
                    owner_id = ?owner_id,
                    %reason,
                    "Article is locked by another admin"
                );
                ctx.notify(SessionNotice::LockConflict { owner_id, reason });
                Ok(())
            }
            Err(e) if e.is_auth_failure() => {
                ctx.state.write().await.lock = LockState::released();
                ctx.finish(ExitReason::AuthExpired, AUTH_EXPIRED_MESSAGE).await;
                Err(SessionError::AuthExpired(e))
            }
            Err(e) => {
                {
                    let mut state = ctx.state.write().await;
                    state.lock = LockState::released();
                    state.phase = SessionPhase::Editing { locked: false };
                }
                tracing::warn!(article_id = %ctx.article_id, error = %e, "Failed to lock article");
                ctx.notify(SessionNotice::LockUnavailable {
                    reason: e.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Apply one field edit to the draft. Returns `false` if the edit
    /// changed nothing (e.g. a duplicate tag).
    pub async fn edit(&self, edit: ArticleEdit) -> Result<bool, SessionError> {
        let mut state = self.ctx.state.write().await;
        if !state.phase.is_editing() {
            return Err(SessionError::NotEditing(state.phase.clone()));
        }

        let changed = state.draft.apply(edit);
        if changed {
            state.dirty = true;
            state.revision += 1;
        }
        Ok(changed)
    }

    /// Persist the draft and end the session.
    ///
    /// Autosave is stopped first and any autosave already in flight is
    /// awaited, so two updates never overlap. On success the lock is
    /// released. A retryable failure returns the session to editing with
    /// its timers running again.
    pub async fn save(&mut self) -> Result<(), SessionError> {
        let locked = {
            let mut state = self.ctx.state.write().await;
            let SessionPhase::Editing { locked } = state.phase.clone() else {
                return Err(SessionError::NotEditing(state.phase.clone()));
            };
            state.phase = SessionPhase::Saving;
            locked
        };
        self.timers.stop();

        let result = {
            let _persisting = self.ctx.persist_gate.lock().await;
            let (update, revision) = {
                let state = self.ctx.state.read().await;
                (state.draft.to_update(), state.revision)
            };
            self.ctx
                .store
                .update_article(&self.ctx.article_id, &update)
                .await
                .map(|()| revision)
        };

        match result {
            Ok(revision) => {
                self.ctx.mark_saved(revision).await;
                tracing::info!(article_id = %self.ctx.article_id, "Article saved");
                self.teardown(ExitReason::Saved, "Article updated successfully.")
                    .await;
                Ok(())
            }
            Err(e) if e.is_ownership_violation() => {
                tracing::warn!(article_id = %self.ctx.article_id, error = %e, "Save refused");
                self.ctx.state.write().await.lock = LockState::released();
                self.ctx
                    .finish(ExitReason::OwnershipLost, OWNERSHIP_LOST_MESSAGE)
                    .await;
                Err(SessionError::NotLockOwner)
            }
            Err(e) if e.is_auth_failure() => {
                self.ctx.state.write().await.lock = LockState::released();
                self.ctx
                    .finish(ExitReason::AuthExpired, AUTH_EXPIRED_MESSAGE)
                    .await;
                Err(SessionError::AuthExpired(e))
            }
            Err(e) => {
                tracing::warn!(article_id = %self.ctx.article_id, error = %e, "Save failed");
                self.ctx.state.write().await.phase = SessionPhase::Editing { locked };
                if locked {
                    self.timers.start(&self.ctx);
                }
                self.ctx.notify(SessionNotice::SaveFailed {
                    reason: e.to_string(),
                });
                Err(SessionError::Save(e))
            }
        }
    }

    /// Abandon the draft and end the session. Unsaved changes are
    /// discarded. A no-op on a session that already exited.
    pub async fn cancel(&mut self) {
        self.teardown(ExitReason::Cancelled, "Editing cancelled.")
            .await;
    }

    /// Leave the editor. Refuses with [`SessionError::UnsavedChanges`] when
    /// the navigation guard asks for confirmation and `confirmed` is false.
    pub async fn leave(&mut self, confirmed: bool) -> Result<(), SessionError> {
        if !confirmed {
            if let NavigationGuard::Confirm { .. } = self.navigation_guard().await {
                return Err(SessionError::UnsavedChanges);
            }
        }

        self.teardown(ExitReason::NavigatedAway, "Left the editor.")
            .await;
        Ok(())
    }

    /// Give up the lock but keep the editor open. The draft stays as it is;
    /// later saves may be rejected.
    pub async fn manual_unlock(&mut self) -> Result<(), SessionError> {
        {
            let mut state = self.ctx.state.write().await;
            if !state.phase.is_editing() {
                return Err(SessionError::NotEditing(state.phase.clone()));
            }
            if !state.lock.held {
                return Ok(());
            }
            state.phase = SessionPhase::Editing { locked: false };
        }

        self.timers.stop();
        if let Err(e) = self.ctx.release_lock().await {
            self.ctx
                .finish(ExitReason::AuthExpired, AUTH_EXPIRED_MESSAGE)
                .await;
            return Err(SessionError::AuthExpired(e));
        }
        Ok(())
    }

    pub async fn navigation_guard(&self) -> NavigationGuard {
        let state = self.ctx.state.read().await;
        if state.dirty && state.lock.held && !state.phase.is_exited() {
            NavigationGuard::Confirm {
                message: UNSAVED_CHANGES_MESSAGE.to_string(),
            }
        } else {
            NavigationGuard::Allow
        }
    }

    async fn teardown(&mut self, reason: ExitReason, message: &str) {
        self.timers.stop();

        let Some(held) = self.ctx.begin_exit(&reason).await else {
            return;
        };
        // The session has already exited, so an auth failure changes nothing.
        if held {
            let _ = self.ctx.release_lock().await;
        }
        self.ctx.announce_exit(reason, message);
    }

    // -- accessors --

    pub fn article_id(&self) -> &str {
        &self.ctx.article_id
    }

    pub fn owner_id(&self) -> &str {
        &self.ctx.owner_id
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.ctx.state.read().await.snapshot()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.ctx.state.read().await.phase.clone()
    }

    pub async fn lock_state(&self) -> LockState {
        self.ctx.state.read().await.lock.clone()
    }

    pub async fn draft(&self) -> EditableArticle {
        self.ctx.state.read().await.draft.clone()
    }

    pub async fn has_unsaved_changes(&self) -> bool {
        self.ctx.state.read().await.dirty
    }

    pub async fn last_saved(&self) -> Option<Timestamp> {
        self.ctx.state.read().await.last_saved
    }

    /// Human-readable age of the last successful save.
    pub async fn last_saved_label(&self) -> Option<String> {
        self.last_saved()
            .await
            .map(|saved_at| format_last_saved(saved_at, Utc::now()))
    }

    pub fn heartbeat_state(&self) -> TimerState {
        self.timers.heartbeat.state()
    }

    pub fn autosave_state(&self) -> TimerState {
        self.timers.autosave.state()
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        self.timers.stop();

        let ctx = self.ctx.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let Some(held) = ctx.begin_exit(&ExitReason::Closed).await else {
                        return;
                    };
                    if held {
                        let _ = ctx.release_lock().await;
                    }
                    ctx.announce_exit(ExitReason::Closed, "Editing session closed.");
                });
            }
            Err(_) => {
                tracing::warn!(
                    article_id = %ctx.article_id,
                    "No runtime to release lock on drop, leaving it to expire"
                );
            }
        }
    }
}
