//! HTTP client for the newsdesk admin endpoints.
//!
//! Wraps article fetch/update, the three lock operations and login using
//! [`reqwest`]. Every request carries the bearer token the client was
//! built with.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use newsdesk_core::article::{validate_article_id, ArticleUpdate, EditableArticle};
use newsdesk_core::lock::LockStatus;

use crate::collaborator::{AcquireOutcome, ReleaseOutcome};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::wire::{Envelope, ErrorBody, WireArticle, WireLockInfo};

/// Path prefix for admin endpoints.
const ADMIN_PREFIX: &str = "/api/admin";

/// HTTP client for one newsdesk API host.
#[derive(Clone)]
pub struct NewsdeskApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl NewsdeskApi {
    /// Create an unauthenticated client. Call [`with_token`](Self::with_token)
    /// (or log in via [`crate::auth`]) before using admin endpoints.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across sessions).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// A copy of this client that authenticates with `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one article.
    ///
    /// Sends `GET /article/{id}` and maps the record through the wire
    /// adapter.
    pub async fn fetch_article(&self, article_id: &str) -> Result<EditableArticle, ApiError> {
        validate_article_id(article_id)?;
        let response = self
            .authorized(self.client.get(self.article_url(article_id, "")))
            .send()
            .await?;

        let envelope: Envelope<WireArticle> = Self::parse_envelope(response).await?;
        if !envelope.success {
            return Err(ApiError::Rejected(envelope.message_or("article not found")));
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Decode("article response has no data".into()))?
            .into_article()
    }

    /// Persist a draft.
    ///
    /// Sends `PUT /article/{id}` with the partial update body. A 2xx answer
    /// with `success: false` (e.g. "You do not own the lock") is returned as
    /// [`ApiError::Rejected`].
    pub async fn update_article(
        &self,
        article_id: &str,
        update: &ArticleUpdate,
    ) -> Result<(), ApiError> {
        validate_article_id(article_id)?;
        let response = self
            .authorized(self.client.put(self.article_url(article_id, "")))
            .json(update)
            .send()
            .await?;

        let envelope: Envelope<serde_json::Value> = Self::parse_envelope(response).await?;
        if !envelope.success {
            return Err(ApiError::Rejected(envelope.message_or("update failed")));
        }
        Ok(())
    }

    /// Request the editing lock.
    ///
    /// Sends `POST /article/{id}/lock`. A refusal because someone else
    /// holds the lock is an [`AcquireOutcome::Conflict`], not an error.
    pub async fn acquire_lock(&self, article_id: &str) -> Result<AcquireOutcome, ApiError> {
        validate_article_id(article_id)?;
        let response = self
            .authorized(self.client.post(self.article_url(article_id, "/lock")))
            .send()
            .await?;

        let status = response.status();
        Self::reject_unauthorized(status, &response)?;
        if status == StatusCode::NOT_FOUND || status.is_server_error() {
            return Err(Self::failure(response).await);
        }

        let body = response.text().await?;
        let envelope: Envelope<WireLockInfo> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(ApiError::Decode(format!("lock response: {e}")));
            }
            Err(_) => {
                return Ok(AcquireOutcome::Conflict {
                    owner_id: None,
                    reason: body,
                });
            }
        };

        if status.is_success() && envelope.success {
            return Ok(AcquireOutcome::Acquired);
        }

        let reason = envelope.message_or("article is locked by another admin");
        let owner_id = envelope
            .data
            .and_then(|info| info.into_status().locked_by);
        Ok(AcquireOutcome::Conflict { owner_id, reason })
    }

    /// Give up the editing lock.
    ///
    /// Sends `POST /article/{id}/unlock`. Releasing a lock that is not held
    /// yields [`ReleaseOutcome::NotHeld`].
    pub async fn release_lock(&self, article_id: &str) -> Result<ReleaseOutcome, ApiError> {
        validate_article_id(article_id)?;
        let response = self
            .authorized(self.client.post(self.article_url(article_id, "/unlock")))
            .send()
            .await?;

        let status = response.status();
        Self::reject_unauthorized(status, &response)?;
        if status.is_server_error() {
            return Err(Self::failure(response).await);
        }

        let body = response.text().await?;
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(&body).unwrap_or(Envelope {
                success: false,
                message: Some(body.clone()),
                data: None,
            });

        if status.is_success() && envelope.success {
            Ok(ReleaseOutcome::Released)
        } else {
            Ok(ReleaseOutcome::NotHeld(envelope.message_or("lock not held")))
        }
    }

    /// Ask who holds the lock, without touching it.
    ///
    /// Sends `GET /article/{id}/lock-status`.
    pub async fn lock_status(&self, article_id: &str) -> Result<LockStatus, ApiError> {
        validate_article_id(article_id)?;
        let response = self
            .authorized(self.client.get(self.article_url(article_id, "/lock-status")))
            .send()
            .await?;

        let envelope: Envelope<WireLockInfo> = Self::parse_envelope(response).await?;
        if !envelope.success {
            return Err(ApiError::Rejected(envelope.message_or("lock status unavailable")));
        }
        envelope
            .data
            .map(WireLockInfo::into_status)
            .ok_or_else(|| ApiError::Decode("lock status response has no data".into()))
    }

    // ---- crate helpers ----

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or the matching [`ApiError`] with the status
    /// and message on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        Self::reject_unauthorized(status, &response)?;
        if !status.is_success() {
            return Err(Self::failure(response).await);
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    pub(crate) async fn parse_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // ---- private helpers ----

    fn article_url(&self, article_id: &str, suffix: &str) -> String {
        self.url(&format!("{ADMIN_PREFIX}/article/{article_id}{suffix}"))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn reject_unauthorized(
        status: StatusCode,
        response: &reqwest::Response,
    ) -> Result<(), ApiError> {
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %response.url(), "API rejected bearer credential");
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
                message: "authentication required".into(),
            });
        }
        Ok(())
    }

    /// Turn a non-2xx response into [`ApiError::Status`], preferring the
    /// JSON `message` over the raw body.
    async fn failure(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);
        ApiError::Status { status, message }
    }
}

impl std::fmt::Debug for NewsdeskApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsdeskApi")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}
