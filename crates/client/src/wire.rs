//! Wire shapes returned by the newsdesk API and the adapter that maps them
//! onto canonical `newsdesk-core` records.
//!
//! Every lenient-parsing decision lives here so nothing downstream has to
//! guess between alternate field names.

use serde::Deserialize;

use newsdesk_core::admin::{AdminIdentity, AdminRole};
use newsdesk_core::article::{parse_categories, EditableArticle, Language};
use newsdesk_core::lock::LockStatus;
use newsdesk_core::types::AdminId;

use crate::error::ApiError;

/// Standard `{success, message, data}` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Body used only to pull a `message` out of an error response.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireCategory {
    Many(Vec<String>),
    One(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireArticle {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    article_id: Option<String>,
    title: Option<String>,
    two_line_description: Option<String>,
    four_line_description: Option<String>,
    swipe_description: Option<String>,
    content: Option<String>,
    category: Option<WireCategory>,
    tags: Option<Vec<String>>,
    is_headline: Option<bool>,
    is_published: Option<bool>,
    language: Option<String>,
    image_url: Option<String>,
    source: Option<String>,
}

impl WireArticle {
    /// Map the API record onto an [`EditableArticle`].
    ///
    /// The identifier resolves from `_id`, then `id`, then `articleId`; a
    /// record with none of them is rejected. A missing language defaults to
    /// English, an unknown one is rejected.
    pub fn into_article(self) -> Result<EditableArticle, ApiError> {
        let id = [self.mongo_id, self.id, self.article_id]
            .into_iter()
            .flatten()
            .find(|id| !id.trim().is_empty())
            .ok_or_else(|| ApiError::Decode("article has no identifier".into()))?;

        let language = match self.language.as_deref() {
            None | Some("") => Language::default(),
            Some(code) => Language::from_wire(code)
                .map_err(|e| ApiError::Decode(format!("article {id}: {e}")))?,
        };

        let categories = match self.category {
            Some(WireCategory::Many(list)) => list
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            Some(WireCategory::One(raw)) => parse_categories(&raw),
            None => Vec::new(),
        };

        Ok(EditableArticle {
            id,
            title: self.title.unwrap_or_default(),
            two_line_summary: self.two_line_description.unwrap_or_default(),
            four_line_summary: self.four_line_description.unwrap_or_default(),
            swipe_summary: self.swipe_description.unwrap_or_default(),
            full_description: self.content.unwrap_or_default(),
            categories,
            tags: self.tags.unwrap_or_default(),
            is_headline: self.is_headline.unwrap_or(false),
            is_published: self.is_published.unwrap_or(false),
            language,
            image_url: self.image_url.unwrap_or_default(),
            source_url: self.source.unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Locks
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireOwnerRef {
    #[serde(rename = "_id", alias = "id")]
    id: String,
}

/// `lockedBy` is either a bare admin ID or a populated admin document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireOwner {
    Id(String),
    Admin(WireOwnerRef),
}

impl WireOwner {
    pub fn into_id(self) -> AdminId {
        match self {
            WireOwner::Id(id) => id,
            WireOwner::Admin(admin) => admin.id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireLockInfo {
    #[serde(default)]
    pub is_locked: Option<bool>,
    pub locked_by: Option<WireOwner>,
}

impl WireLockInfo {
    pub fn into_status(self) -> LockStatus {
        let locked_by = self.locked_by.map(WireOwner::into_id);
        LockStatus {
            is_locked: self.is_locked.unwrap_or(locked_by.is_some()),
            locked_by,
        }
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireAdmin {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: AdminRole,
}

impl From<WireAdmin> for AdminIdentity {
    fn from(admin: WireAdmin) -> Self {
        AdminIdentity {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            role: admin.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireLogin {
    #[serde(default)]
    pub success: bool,
    pub token: Option<String>,
    pub admin: Option<WireAdmin>,
    pub message: Option<String>,
}
