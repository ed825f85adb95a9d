//! Shared fixtures for session tests: an in-memory lock and article store
//! with injectable faults and latency, and an observer that records what
//! the session reported.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use newsdesk_client::{AcquireOutcome, ApiError, ArticleStore, LockClient, ReleaseOutcome};
use newsdesk_core::article::{ArticleUpdate, EditableArticle};
use newsdesk_core::lock::{LockStatus, NOT_LOCK_OWNER_MESSAGE};
use newsdesk_session::{
    Collaborators, EditSession, SessionConfig, SessionExit, SessionNotice, SessionObserver,
};

pub const ARTICLE_ID: &str = "X123";

/// Kinds of failure the fake backend can inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Transport,
    Unauthorized,
    NotOwner,
    Server,
}

impl Fault {
    pub fn error(self) -> ApiError {
        match self {
            Fault::Transport => {
                let err = reqwest::Client::new().get("://unreachable").build().unwrap_err();
                ApiError::Request(err)
            }
            Fault::Unauthorized => ApiError::Unauthorized {
                status: 401,
                message: "Token expired".into(),
            },
            Fault::NotOwner => ApiError::Rejected(NOT_LOCK_OWNER_MESSAGE.into()),
            Fault::Server => ApiError::Status {
                status: 503,
                message: "Service unavailable".into(),
            },
        }
    }
}

/// Server-side state shared by every admin's view of the backend.
#[derive(Debug, Default)]
pub struct Backend {
    pub article: Option<EditableArticle>,
    pub owner: Option<String>,
    pub updates: Vec<ArticleUpdate>,
    pub acquires: usize,
    pub releases: usize,
    pub status_queries: usize,
    pub acquire_fault: Option<Fault>,
    pub status_fault: Option<Fault>,
    pub update_fault: Option<Fault>,
    pub release_fault: Option<Fault>,
    pub status_delay: Duration,
    pub release_delay: Duration,
    pub update_delay: Duration,
    pub in_flight_updates: usize,
    pub max_in_flight_updates: usize,
}

pub type SharedBackend = Arc<Mutex<Backend>>;

pub fn backend_with_article() -> SharedBackend {
    Arc::new(Mutex::new(Backend {
        article: Some(EditableArticle {
            id: ARTICLE_ID.into(),
            title: "Budget passed".into(),
            tags: vec!["economy".into()],
            ..Default::default()
        }),
        ..Default::default()
    }))
}

/// One admin's authenticated view of the backend.
pub struct FakeApi {
    admin: String,
    backend: SharedBackend,
}

impl FakeApi {
    pub fn new(admin: &str, backend: &SharedBackend) -> Self {
        Self {
            admin: admin.to_string(),
            backend: backend.clone(),
        }
    }
}

#[async_trait]
impl LockClient for FakeApi {
    async fn acquire(&self, _article_id: &str) -> Result<AcquireOutcome, ApiError> {
        let mut backend = self.backend.lock().unwrap();
        backend.acquires += 1;
        if let Some(fault) = backend.acquire_fault {
            return Err(fault.error());
        }
        match backend.owner.clone() {
            Some(owner) if owner != self.admin => Ok(AcquireOutcome::Conflict {
                owner_id: Some(owner),
                reason: "Article is currently being edited by another admin".into(),
            }),
            _ => {
                backend.owner = Some(self.admin.clone());
                Ok(AcquireOutcome::Acquired)
            }
        }
    }

    async fn release(&self, _article_id: &str) -> Result<ReleaseOutcome, ApiError> {
        let delay = {
            let mut backend = self.backend.lock().unwrap();
            backend.releases += 1;
            backend.release_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut backend = self.backend.lock().unwrap();
        if let Some(fault) = backend.release_fault {
            return Err(fault.error());
        }
        if backend.owner.as_deref() == Some(self.admin.as_str()) {
            backend.owner = None;
            Ok(ReleaseOutcome::Released)
        } else {
            Ok(ReleaseOutcome::NotHeld(NOT_LOCK_OWNER_MESSAGE.into()))
        }
    }

    async fn query_status(&self, _article_id: &str) -> Result<LockStatus, ApiError> {
        let delay = {
            let mut backend = self.backend.lock().unwrap();
            backend.status_queries += 1;
            backend.status_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let backend = self.backend.lock().unwrap();
        if let Some(fault) = backend.status_fault {
            return Err(fault.error());
        }
        Ok(LockStatus {
            is_locked: backend.owner.is_some(),
            locked_by: backend.owner.clone(),
        })
    }
}

#[async_trait]
impl ArticleStore for FakeApi {
    async fn fetch_article(&self, _article_id: &str) -> Result<EditableArticle, ApiError> {
        self.backend
            .lock()
            .unwrap()
            .article
            .clone()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Article not found".into(),
            })
    }

    async fn update_article(
        &self,
        _article_id: &str,
        update: &ArticleUpdate,
    ) -> Result<(), ApiError> {
        let delay = {
            let mut backend = self.backend.lock().unwrap();
            backend.in_flight_updates += 1;
            backend.max_in_flight_updates =
                backend.max_in_flight_updates.max(backend.in_flight_updates);
            backend.update_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut backend = self.backend.lock().unwrap();
        backend.in_flight_updates -= 1;
        if let Some(fault) = backend.update_fault {
            return Err(fault.error());
        }
        if backend.owner.as_deref() != Some(self.admin.as_str()) {
            return Err(Fault::NotOwner.error());
        }
        backend.updates.push(update.clone());
        Ok(())
    }
}

/// Observer that keeps every exit and notice.
#[derive(Default)]
pub struct RecordingObserver {
    pub exits: Mutex<Vec<SessionExit>>,
    pub notices: Mutex<Vec<SessionNotice>>,
}

impl RecordingObserver {
    pub fn exits(&self) -> Vec<SessionExit> {
        self.exits.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<SessionNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_exit(&self, exit: &SessionExit) {
        self.exits.lock().unwrap().push(exit.clone());
    }

    fn on_notice(&self, notice: &SessionNotice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

pub fn collaborators(
    admin: &str,
    backend: &SharedBackend,
    observer: &Arc<RecordingObserver>,
) -> Collaborators {
    let api = Arc::new(FakeApi::new(admin, backend));
    Collaborators {
        locks: api.clone(),
        store: api,
        observer: observer.clone(),
    }
}

/// Open a session for `admin` with default timings.
pub async fn open_session(
    admin: &str,
    backend: &SharedBackend,
    observer: &Arc<RecordingObserver>,
) -> EditSession {
    open_with(admin, backend, observer, SessionConfig::default()).await
}

pub async fn open_with(
    admin: &str,
    backend: &SharedBackend,
    observer: &Arc<RecordingObserver>,
    config: SessionConfig,
) -> EditSession {
    EditSession::open(ARTICLE_ID, admin, collaborators(admin, backend, observer), config)
        .await
        .expect("session opens")
}

/// Advance paused time by `secs` seconds, letting timer tasks run.
pub async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}
