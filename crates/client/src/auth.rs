//! Admin and superadmin login.

use newsdesk_core::admin::AdminSession;

use crate::api::NewsdeskApi;
use crate::error::ApiError;
use crate::wire::WireLogin;

const ADMIN_LOGIN_PATH: &str = "/api/admin/login";
const SUPERADMIN_LOGIN_PATH: &str = "/api/superadmin/login";

impl NewsdeskApi {
    /// Log in and return the issued token with the admin identity.
    ///
    /// Identifiers containing `@` try the superadmin login first and fall
    /// back to the admin login when it is refused. Other identifiers go
    /// straight to the admin login. Transport failures are not retried.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AdminSession, ApiError> {
        if identifier.contains('@') {
            match self.login_at(SUPERADMIN_LOGIN_PATH, identifier, password).await {
                Ok(session) => return Ok(session),
                Err(ApiError::Request(e)) => return Err(ApiError::Request(e)),
                Err(e) => {
                    tracing::debug!(error = %e, "Superadmin login refused, trying admin login");
                }
            }
        }
        self.login_at(ADMIN_LOGIN_PATH, identifier, password).await
    }

    async fn login_at(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<AdminSession, ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self.http().post(self.url(path)).json(&body).send().await?;
        let login: WireLogin = Self::parse_envelope(response).await?;

        match (login.success, login.token, login.admin) {
            (true, Some(token), Some(admin)) => {
                tracing::info!(admin_id = %admin.id, role = ?admin.role, "Logged in");
                Ok(AdminSession {
                    token,
                    admin: admin.into(),
                })
            }
            (_, _, _) => Err(ApiError::Rejected(
                login
                    .message
                    .unwrap_or_else(|| "invalid credentials".to_string()),
            )),
        }
    }
}
