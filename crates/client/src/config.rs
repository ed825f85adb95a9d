use std::time::Duration;

/// Default API host when `NEWSDESK_API_BASE` is unset.
pub const DEFAULT_API_BASE: &str = "https://api.otito.in";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the newsdesk REST API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API host without a trailing slash, e.g. `https://api.otito.in`.
    pub base_url: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `NEWSDESK_API_BASE`             | `https://api.otito.in`  |
    /// | `NEWSDESK_REQUEST_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("NEWSDESK_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());

        let request_timeout_secs: u64 = std::env::var("NEWSDESK_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            request_timeout: Duration::from_secs(request_timeout_secs),
            ..Self::new(base_url)
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}
