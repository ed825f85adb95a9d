//! The collaborator seams an edit session talks to: the lock store and the
//! article store. [`NewsdeskApi`] implements both over HTTP; tests supply
//! in-memory fakes.

use async_trait::async_trait;

use newsdesk_core::article::{ArticleUpdate, EditableArticle};
use newsdesk_core::lock::LockStatus;
use newsdesk_core::types::AdminId;

use crate::api::NewsdeskApi;
use crate::error::ApiError;

/// Result of an acquire attempt that reached the lock store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The caller is now the only permitted editor.
    Acquired,
    /// Someone else holds the lock. An expected outcome, not a failure.
    Conflict {
        owner_id: Option<AdminId>,
        reason: String,
    },
}

/// Result of a release attempt that reached the lock store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    /// The caller did not hold the lock (already released, expired or
    /// taken over). Carries the server's explanation.
    NotHeld(String),
}

/// Remote lock operations for a single article.
#[async_trait]
pub trait LockClient: Send + Sync {
    /// Request the exclusive editing lock.
    async fn acquire(&self, article_id: &str) -> Result<AcquireOutcome, ApiError>;

    /// Give up the lock. Releasing an unheld lock is not an error.
    async fn release(&self, article_id: &str) -> Result<ReleaseOutcome, ApiError>;

    /// Read the current lock status without acquiring or extending it.
    async fn query_status(&self, article_id: &str) -> Result<LockStatus, ApiError>;
}

/// Remote article storage.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn fetch_article(&self, article_id: &str) -> Result<EditableArticle, ApiError>;

    async fn update_article(
        &self,
        article_id: &str,
        update: &ArticleUpdate,
    ) -> Result<(), ApiError>;
}

#[async_trait]
impl LockClient for NewsdeskApi {
    async fn acquire(&self, article_id: &str) -> Result<AcquireOutcome, ApiError> {
        self.acquire_lock(article_id).await
    }

    async fn release(&self, article_id: &str) -> Result<ReleaseOutcome, ApiError> {
        self.release_lock(article_id).await
    }

    async fn query_status(&self, article_id: &str) -> Result<LockStatus, ApiError> {
        self.lock_status(article_id).await
    }
}

#[async_trait]
impl ArticleStore for NewsdeskApi {
    async fn fetch_article(&self, article_id: &str) -> Result<EditableArticle, ApiError> {
        NewsdeskApi::fetch_article(self, article_id).await
    }

    async fn update_article(
        &self,
        article_id: &str,
        update: &ArticleUpdate,
    ) -> Result<(), ApiError> {
        NewsdeskApi::update_article(self, article_id, update).await
    }
}
