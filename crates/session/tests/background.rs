//! Heartbeat and autosave behaviour over simulated time.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;

use common::{advance, backend_with_article, open_session, open_with, Fault, RecordingObserver};
use newsdesk_core::article::ArticleEdit;
use newsdesk_session::{ExitReason, SessionConfig, SessionPhase, TimerState};

// ---------------------------------------------------------------------------
// Test: autosave persists a dirty draft and clears the flag
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn autosave_clears_dirty_flag() {
    let backend = backend_with_article();
    let observer = Arc::new(RecordingObserver::default());
    let session = open_session("alice", &backend, &observer).await;
    let opened_at = session.last_saved().await.unwrap();

    session
        .edit(ArticleEdit::Title("Budget passed, markets rally".into()))
        .await
        .unwrap();
    assert!(session.has_unsaved_changes().await);

    advance(59).await;
    assert!(backend.lock().unwrap().updates.is_empty());

    advance(2).await;
    {
        let state = backend.lock().unwrap();
        assert_eq!(state.updates.len(), 1);
        assert_eq!(state.updates[0].title, "Budget passed, markets rally");
    }
    assert!(!session.has_unsaved_changes().await);
    assert!(session.last_saved().await.unwrap() >= opened_at);

    // Any later edit makes the draft dirty again.
    session.edit(ArticleEdit::Headline(true)).await.unwrap();
    assert!(session.has_unsaved_changes().await);
}

#[tokio::test(start_paused = true)]
async fn autosave_skips_clean_draft() {
    let backend = backend_with_article();
    let observer = Arc::new(RecordingObserver::default());
    let _session = open_session("alice", &backend, &observer).await;

    advance(185).await;
    assert!(backend.lock().unwrap().updates.is_empty());
}

#[tokio::test(start_paused = true)]
async fn no_op_edit_leaves_draft_clean() {
    let backend = backend_with_article();
    let observer = Arc::new(RecordingObserver::default());
    let session = open_session("alice", &backend, &observer).await;

    let changed = session
        .edit(ArticleEdit::AddTag("economy".into()))
        .await
        .unwrap();
    assert!(!changed);
    assert!(!session.has_unsaved_changes().await);
}

// ---------------------------------------------------------------------------
// Test: a failed autosave keeps the draft dirty and retries
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn failed_autosave_retries_next_tick() {
    let backend = backend_with_article();
    let observer = Arc::new(RecordingObserver::default());
    let session = open_session("alice", &backend, &observer).await;
    session.edit(ArticleEdit::Title("Retry me".into())).await.unwrap();
    backend.lock().unwrap().update_fault = Some(Fault::Transport);

    advance(61).await;
    assert!(session.has_unsaved_changes().await);
    assert_eq!(session.phase().await, SessionPhase::Editing { locked: true });

    backend.lock().unwrap().update_fault = None;
    advance(60).await;
    assert!(!session.has_unsaved_changes().await);
    assert_eq!(backend.lock().unwrap().updates.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: an edit made while an autosave is in flight stays dirty
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn edit_during_autosave_stays_dirty() {
    let backend = backend_with_article();
    backend.lock().unwrap().update_delay = Duration::from_secs(5);
    let observer = Arc::new(RecordingObserver::default());
    let session = open_session("alice", &backend, &observer).await;
    session.edit(ArticleEdit::Title("One".into())).await.unwrap();

    advance(61).await;
    session.edit(ArticleEdit::Title("Two".into())).await.unwrap();
    advance(5).await;

    assert_eq!(backend.lock().unwrap().updates.len(), 1);
    assert!(session.has_unsaved_changes().await);
}

// ---------------------------------------------------------------------------
// Test: heartbeat detects a force-released lock within one period
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn heartbeat_detects_force_release() {
    let backend = backend_with_article();
    let observer = Arc::new(RecordingObserver::default());
    let session = open_session("alice", &backend, &observer).await;
    session.edit(ArticleEdit::Title("Unsaved".into())).await.unwrap();

    advance(5).await;
    backend.lock().unwrap().owner = None;
    advance(26).await;

    assert_eq!(
        session.phase().await,
        SessionPhase::Exited(ExitReason::LockLost { owner_id: None })
    );
    assert_eq!(session.heartbeat_state(), TimerState::Stopped);
    assert_eq!(session.autosave_state(), TimerState::Stopped);
    assert!(!session.lock_state().await.held);
    assert_matches!(
        observer.exits().as_slice(),
        [exit] if exit.reason.requires_acknowledgement()
            && exit.message.contains("expired")
    );

    // Nothing else runs afterwards: no autosave of the dirty draft.
    advance(120).await;
    let state = backend.lock().unwrap();
    assert!(state.updates.is_empty());
    assert_eq!(state.status_queries, 1);
}

#[tokio::test(start_paused = true)]
async fn heartbeat_reports_new_owner() {
    let backend = backend_with_article();
    let observer = Arc::new(RecordingObserver::default());
    let session = open_session("alice", &backend, &observer).await;

    backend.lock().unwrap().owner = Some("bob".into());
    advance(31).await;

    assert_eq!(
        session.phase().await,
        SessionPhase::Exited(ExitReason::LockLost {
            owner_id: Some("bob".into())
        })
    );
    assert!(session.lock_state().await.is_locked_by_other());
    // The lock was never ours to release.
    assert_eq!(backend.lock().unwrap().releases, 0);
}

#[tokio::test(start_paused = true)]
async fn heartbeat_keeps_confirmed_session() {
    let backend = backend_with_article();
    let observer = Arc::new(RecordingObserver::default());
    let session = open_session("alice", &backend, &observer).await;

    advance(95).await;

    assert_eq!(session.phase().await, SessionPhase::Editing { locked: true });
    assert_eq!(backend.lock().unwrap().status_queries, 3);
    assert!(observer.exits().is_empty());
}

// ---------------------------------------------------------------------------
// Test: transient heartbeat failures are tolerated up to the limit
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn transient_failures_assume_loss_after_limit() {
    let backend = backend_with_article();
    backend.lock().unwrap().status_fault = Some(Fault::Transport);
    let observer = Arc::new(RecordingObserver::default());
    let config = SessionConfig {
        max_heartbeat_failures: 3,
        ..SessionConfig::default()
    };
    let session = open_with("alice", &backend, &observer, config).await;

    advance(61).await;
    assert_eq!(session.phase().await, SessionPhase::Editing { locked: true });

    advance(30).await;
    assert_eq!(
        session.phase().await,
        SessionPhase::Exited(ExitReason::LockLost { owner_id: None })
    );
    assert_eq!(session.heartbeat_state(), TimerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn assumed_loss_still_releases_server_lock() {
    let backend = backend_with_article();
    backend.lock().unwrap().status_fault = Some(Fault::Transport);
    let observer = Arc::new(RecordingObserver::default());
    let config = SessionConfig {
        max_heartbeat_failures: 2,
        ..SessionConfig::default()
    };
    let session = open_with("alice", &backend, &observer, config).await;

    advance(61).await;
    assert_eq!(
        session.phase().await,
        SessionPhase::Exited(ExitReason::LockLost { owner_id: None })
    );
    {
        let state = backend.lock().unwrap();
        assert_eq!(state.owner, None);
        assert_eq!(state.releases, 1);
    }

    // Status checks recover, then the editor closes.
    backend.lock().unwrap().status_fault = None;
    drop(session);
    advance(5).await;

    assert_eq!(backend.lock().unwrap().releases, 1);
    assert_matches!(
        observer.exits().as_slice(),
        [exit] if exit.reason == ExitReason::LockLost { owner_id: None }
    );
}

#[tokio::test(start_paused = true)]
async fn a_success_resets_failure_count() {
    let backend = backend_with_article();
    backend.lock().unwrap().status_fault = Some(Fault::Server);
    let observer = Arc::new(RecordingObserver::default());
    let config = SessionConfig {
        max_heartbeat_failures: 2,
        ..SessionConfig::default()
    };
    let session = open_with("alice", &backend, &observer, config).await;

    advance(31).await;
    backend.lock().unwrap().status_fault = None;
    advance(30).await;
    backend.lock().unwrap().status_fault = Some(Fault::Server);
    advance(30).await;

    assert_eq!(session.phase().await, SessionPhase::Editing { locked: true });
}

#[tokio::test(start_paused = true)]
async fn zero_limit_never_assumes_loss() {
    let backend = backend_with_article();
    backend.lock().unwrap().status_fault = Some(Fault::Transport);
    let observer = Arc::new(RecordingObserver::default());
    let config = SessionConfig {
        max_heartbeat_failures: 0,
        ..SessionConfig::default()
    };
    let session = open_with("alice", &backend, &observer, config).await;

    advance(600).await;
    assert_eq!(session.phase().await, SessionPhase::Editing { locked: true });
}

#[tokio::test(start_paused = true)]
async fn slow_status_query_counts_as_failure() {
    let backend = backend_with_article();
    backend.lock().unwrap().status_delay = Duration::from_secs(20);
    let observer = Arc::new(RecordingObserver::default());
    let config = SessionConfig {
        max_heartbeat_failures: 1,
        ..SessionConfig::default()
    };
    let session = open_with("alice", &backend, &observer, config).await;

    // First heartbeat at 30s times out at 40s.
    advance(41).await;
    assert_eq!(
        session.phase().await,
        SessionPhase::Exited(ExitReason::LockLost { owner_id: None })
    );
}

// ---------------------------------------------------------------------------
// Test: an expired credential ends the session
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn unauthorized_heartbeat_expires_session() {
    let backend = backend_with_article();
    let observer = Arc::new(RecordingObserver::default());
    let session = open_session("alice", &backend, &observer).await;
    backend.lock().unwrap().status_fault = Some(Fault::Unauthorized);

    advance(31).await;

    assert_eq!(
        session.phase().await,
        SessionPhase::Exited(ExitReason::AuthExpired)
    );
    assert_eq!(session.autosave_state(), TimerState::Stopped);
    assert_matches!(
        observer.exits().as_slice(),
        [exit] if exit.reason == ExitReason::AuthExpired
    );
}

// ---------------------------------------------------------------------------
// Test: autosave refused for ownership ends the session
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn autosave_ownership_violation_exits() {
    let backend = backend_with_article();
    let observer = Arc::new(RecordingObserver::default());
    let config = SessionConfig {
        // Keep the heartbeat out of the way.
        heartbeat_interval: Duration::from_secs(600),
        ..SessionConfig::default()
    };
    let session = open_with("alice", &backend, &observer, config).await;
    session.edit(ArticleEdit::Title("Mine".into())).await.unwrap();
    backend.lock().unwrap().owner = Some("bob".into());

    advance(61).await;

    assert_eq!(
        session.phase().await,
        SessionPhase::Exited(ExitReason::OwnershipLost)
    );
    assert_eq!(session.heartbeat_state(), TimerState::Stopped);
    assert!(backend.lock().unwrap().updates.is_empty());
}

// ---------------------------------------------------------------------------
// Test: autosave with an expired credential ends the session
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn unauthorized_autosave_expires_session() {
    let backend = backend_with_article();
    let observer = Arc::new(RecordingObserver::default());
    let config = SessionConfig {
        heartbeat_interval: Duration::from_secs(600),
        ..SessionConfig::default()
    };
    let session = open_with("alice", &backend, &observer, config).await;
    session.edit(ArticleEdit::Title("Pending".into())).await.unwrap();
    backend.lock().unwrap().update_fault = Some(Fault::Unauthorized);

    advance(61).await;

    assert_eq!(
        session.phase().await,
        SessionPhase::Exited(ExitReason::AuthExpired)
    );
    assert_eq!(session.heartbeat_state(), TimerState::Stopped);
    assert_eq!(session.autosave_state(), TimerState::Stopped);
    assert!(session.has_unsaved_changes().await);
    assert_matches!(
        observer.exits().as_slice(),
        [exit] if exit.reason == ExitReason::AuthExpired
    );
}
