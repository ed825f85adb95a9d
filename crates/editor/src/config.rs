use std::fmt;

use newsdesk_client::ApiConfig;
use newsdesk_session::SessionConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No article ID given (pass it as the first argument or set ARTICLE_ID)")]
    MissingArticleId,

    #[error("No credentials (set NEWSDESK_EMAIL and NEWSDESK_PASSWORD, or NEWSDESK_TOKEN and NEWSDESK_ADMIN_ID)")]
    MissingCredentials,
}

/// How the editor authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Log in with an email (or username) and password.
    Password { identifier: String, password: String },
    /// Reuse a token issued earlier. `admin_id` must match the token's
    /// subject, since it is compared against the lock owner.
    Token { token: String, admin_id: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password { identifier, .. } => f
                .debug_struct("Password")
                .field("identifier", identifier)
                .field("password", &"[redacted]")
                .finish(),
            Credentials::Token { admin_id, .. } => f
                .debug_struct("Token")
                .field("token", &"[redacted]")
                .field("admin_id", admin_id)
                .finish(),
        }
    }
}

impl Credentials {
    /// Resolve credentials from `lookup`. A token takes precedence over a
    /// password.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let (Some(token), Some(admin_id)) = (lookup("NEWSDESK_TOKEN"), lookup("NEWSDESK_ADMIN_ID")) {
            return Ok(Credentials::Token { token, admin_id });
        }
        if let (Some(identifier), Some(password)) =
            (lookup("NEWSDESK_EMAIL"), lookup("NEWSDESK_PASSWORD"))
        {
            return Ok(Credentials::Password {
                identifier,
                password,
            });
        }
        Err(ConfigError::MissingCredentials)
    }
}

/// Everything the console editor needs to start.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub credentials: Credentials,
    pub article_id: String,
}

impl EditorConfig {
    /// Load configuration from command-line arguments and the environment.
    ///
    /// | Env Var              | Required                      |
    /// |----------------------|-------------------------------|
    /// | `ARTICLE_ID`         | unless given as first argument |
    /// | `NEWSDESK_EMAIL`     | with `NEWSDESK_PASSWORD`      |
    /// | `NEWSDESK_PASSWORD`  | with `NEWSDESK_EMAIL`         |
    /// | `NEWSDESK_TOKEN`     | with `NEWSDESK_ADMIN_ID`      |
    /// | `NEWSDESK_ADMIN_ID`  | with `NEWSDESK_TOKEN`         |
    ///
    /// API and timing settings come from [`ApiConfig::from_env`] and
    /// [`SessionConfig::from_env`].
    pub fn from_env(mut args: impl Iterator<Item = String>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|value| !value.trim().is_empty())
        };

        let article_id = args
            .next()
            .or_else(|| lookup("ARTICLE_ID"))
            .ok_or(ConfigError::MissingArticleId)?;

        Ok(Self {
            api: ApiConfig::from_env(),
            session: SessionConfig::from_env(),
            credentials: Credentials::from_lookup(lookup)?,
            article_id,
        })
    }
}
