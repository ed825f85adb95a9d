//! Periodic lock re-validation.
//!
//! Every heartbeat asks the lock store who holds the article. If the answer
//! is anyone other than this session's admin, the session ends with
//! [`ExitReason::LockLost`]. Transport trouble is tolerated up to a
//! configured number of consecutive failures.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use newsdesk_client::ApiError;

use crate::context::{SessionContext, AUTH_EXPIRED_MESSAGE, LOCK_LOST_MESSAGE};
use crate::observer::ExitReason;
use crate::timer::Tick;

pub(crate) struct Heartbeat {
    ctx: Arc<SessionContext>,
    lease: CancellationToken,
    consecutive_failures: u32,
}

impl Heartbeat {
    pub fn new(ctx: Arc<SessionContext>, lease: CancellationToken) -> Self {
        Self {
            ctx,
            lease,
            consecutive_failures: 0,
        }
    }

    async fn lose_lock(&self, owner_id: Option<String>) -> bool {
        self.ctx
            .force_exit(&self.lease, ExitReason::LockLost { owner_id }, LOCK_LOST_MESSAGE)
            .await
    }

    async fn record_failure(&mut self, error: &str) {
        self.consecutive_failures += 1;
        let max = self.ctx.config.max_heartbeat_failures;

        tracing::warn!(
            article_id = %self.ctx.article_id,
            failures = self.consecutive_failures,
            max_failures = max,
            error,
            "Heartbeat status check failed"
        );

        if max > 0 && self.consecutive_failures >= max {
            tracing::error!(
                article_id = %self.ctx.article_id,
                failures = self.consecutive_failures,
                "Lock status unverifiable, assuming lock lost"
            );
            // The store may still list this admin as owner.
            if self.lose_lock(None).await {
                let _ = self.ctx.release_lock().await;
            }
        }
    }
}

#[async_trait]
impl Tick for Heartbeat {
    async fn tick(&mut self) {
        if !self.ctx.state.read().await.phase.is_editing_locked() {
            return;
        }

        let query = self.ctx.locks.query_status(&self.ctx.article_id);
        let result = tokio::time::timeout(self.ctx.config.status_timeout, query).await;

        match result {
            Ok(Ok(status)) if status.is_held_by(&self.ctx.owner_id) => {
                self.consecutive_failures = 0;
                tracing::debug!(article_id = %self.ctx.article_id, "Heartbeat: lock confirmed");
            }
            Ok(Ok(status)) => {
                tracing::warn!(
                    article_id = %self.ctx.article_id,
                    locked = status.is_locked,
                    locked_by = ?status.locked_by,
                    "Heartbeat: lock no longer held"
                );
                let is_locked = status.is_locked;
                let other = status
                    .locked_by
                    .filter(|owner| is_locked && *owner != self.ctx.owner_id);
                self.lose_lock(other).await;
            }
            Ok(Err(e)) if e.is_auth_failure() => {
                self.ctx
                    .force_exit(&self.lease, ExitReason::AuthExpired, AUTH_EXPIRED_MESSAGE)
                    .await;
            }
            Ok(Err(ApiError::Rejected(message))) => {
                // The store answered but would not confirm ownership.
                tracing::warn!(
                    article_id = %self.ctx.article_id,
                    %message,
                    "Heartbeat: status check rejected"
                );
                self.lose_lock(None).await;
            }
            Ok(Err(e)) => self.record_failure(&e.to_string()).await,
            Err(_) => self.record_failure("status query timed out").await,
        }
    }
}
