//! Periodic persistence of a dirty draft.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::context::{SessionContext, AUTH_EXPIRED_MESSAGE, OWNERSHIP_LOST_MESSAGE};
use crate::observer::ExitReason;
use crate::timer::Tick;

pub(crate) struct Autosave {
    ctx: Arc<SessionContext>,
    lease: CancellationToken,
}

impl Autosave {
    pub fn new(ctx: Arc<SessionContext>, lease: CancellationToken) -> Self {
        Self { ctx, lease }
    }
}

#[async_trait]
impl Tick for Autosave {
    async fn tick(&mut self) {
        // A save already in flight covers this tick.
        let Ok(_persisting) = self.ctx.persist_gate.try_lock() else {
            tracing::debug!(article_id = %self.ctx.article_id, "Autosave skipped, save in flight");
            return;
        };

        let (update, revision) = {
            let state = self.ctx.state.read().await;
            if !state.phase.is_editing_locked() || !state.dirty {
                return;
            }
            (state.draft.to_update(), state.revision)
        };

        match self.ctx.store.update_article(&self.ctx.article_id, &update).await {
            Ok(()) => {
                self.ctx.mark_saved(revision).await;
                tracing::info!(article_id = %self.ctx.article_id, revision, "Draft autosaved");
            }
            Err(e) if e.is_auth_failure() => {
                self.ctx
                    .force_exit(&self.lease, ExitReason::AuthExpired, AUTH_EXPIRED_MESSAGE)
                    .await;
            }
            Err(e) if e.is_ownership_violation() => {
                tracing::warn!(article_id = %self.ctx.article_id, error = %e, "Autosave refused");
                self.ctx
                    .force_exit(&self.lease, ExitReason::OwnershipLost, OWNERSHIP_LOST_MESSAGE)
                    .await;
            }
            Err(e) => {
                // Draft stays dirty; the next tick retries.
                tracing::warn!(article_id = %self.ctx.article_id, error = %e, "Autosave failed");
            }
        }
    }
}
