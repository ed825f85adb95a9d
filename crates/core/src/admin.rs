//! Authenticated admin identity.

use serde::{Deserialize, Serialize};

use crate::types::AdminId;

/// Role attached to an admin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Superadmin,
    Admin,
}

/// The admin a session acts as. Its `id` is the lock owner identity the
/// server reports in `lockedBy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub id: AdminId,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
}

/// A bearer token together with the admin it was issued to.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token: String,
    pub admin: AdminIdentity,
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("token", &"<redacted>")
            .field("admin", &self.admin)
            .finish()
    }
}
