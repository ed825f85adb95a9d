//! Cancellable periodic tasks.
//!
//! A [`PeriodicTask`] runs a [`Tick`] job on a fixed interval inside a
//! spawned tokio task until its [`CancellationToken`] fires. Ticks never
//! overlap: the next tick is only awaited after the previous one returned.
//! Stopping never aborts a tick that is already running; the loop simply
//! exits before the next one.

use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Work performed on every tick of a [`PeriodicTask`].
#[async_trait]
pub trait Tick: Send + 'static {
    async fn tick(&mut self);
}

/// Observable lifecycle of a periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Stopped,
}

/// Handle to a periodic background job.
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    pub fn idle(name: &'static str) -> Self {
        Self {
            name,
            token: None,
            handle: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Start ticking every `period`. The first tick fires one full period
    /// after the call, not immediately.
    ///
    /// The task stops when [`stop`](Self::stop) is called or when `parent`
    /// is cancelled. Starting a task that is already running is a no-op;
    /// starting a stopped task arms it again.
    pub fn start<T: Tick>(&mut self, period: Duration, parent: &CancellationToken, mut job: T) {
        if self.state() == TimerState::Running {
            return;
        }

        let token = parent.child_token();
        let cancel = token.clone();
        let name = self.name;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => job.tick().await,
                }
            }

            tracing::debug!(timer = name, "Timer stopped");
        });

        tracing::debug!(timer = name, period_secs = period.as_secs(), "Timer started");
        self.token = Some(token);
        self.handle = Some(handle);
    }

    /// Stop the task. Idempotent. A task that never started moves
    /// straight to `Stopped`.
    pub fn stop(&mut self) {
        self.token
            .get_or_insert_with(CancellationToken::new)
            .cancel();
    }

    pub fn state(&self) -> TimerState {
        match &self.token {
            None => TimerState::Idle,
            Some(token) if token.is_cancelled() => TimerState::Stopped,
            Some(_) => TimerState::Running,
        }
    }

    /// Whether the background loop has exited. A stopped task whose final
    /// tick is still in flight reports `false`.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}
