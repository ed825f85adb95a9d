use newsdesk_core::error::CoreError;
use newsdesk_core::lock::is_not_owner_message;

/// Errors from the newsdesk REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API rejected the bearer credential. Ends the session.
    #[error("Authentication rejected ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The API returned a non-2xx status code.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The API answered 2xx but with `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The response body did not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The request was refused locally before being sent.
    #[error("Invalid request: {0}")]
    Invalid(#[from] CoreError),
}

impl ApiError {
    /// Returns `true` if the API rejected the caller's credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Returns `true` if the API refused a write because the caller does
    /// not hold the article lock.
    pub fn is_ownership_violation(&self) -> bool {
        match self {
            ApiError::Status { message, .. } | ApiError::Rejected(message) => {
                is_not_owner_message(message)
            }
            _ => false,
        }
    }

    /// Returns `true` for failures worth retrying on the next tick: transport
    /// errors and server-side (5xx) statuses.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Request(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
