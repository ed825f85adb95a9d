//! The editable article record, the edits a session may apply to it, and the
//! partial-update shape the storage API accepts.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::ArticleId;

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Publication language of an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    /// Code used by the storage API (`EN` / `HI`).
    pub fn wire_code(self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Hindi => "HI",
        }
    }

    /// Parse a language code as sent by the storage API.
    ///
    /// Accepts the canonical `EN` / `HI` codes and the legacy lowercase
    /// `english` / `hindi` names. Anything else is rejected.
    pub fn from_wire(code: &str) -> Result<Self, CoreError> {
        match code.trim() {
            "EN" | "en" | "english" => Ok(Language::English),
            "HI" | "hi" | "hindi" => Ok(Language::Hindi),
            other => Err(CoreError::UnknownLanguage(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// EditableArticle
// ---------------------------------------------------------------------------

/// An article as held in an edit session's draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditableArticle {
    pub id: ArticleId,
    pub title: String,
    pub two_line_summary: String,
    pub four_line_summary: String,
    pub swipe_summary: String,
    pub full_description: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub is_headline: bool,
    pub is_published: bool,
    pub language: Language,
    pub image_url: String,
    pub source_url: String,
}

/// A single field mutation applied to a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleEdit {
    Title(String),
    TwoLineSummary(String),
    FourLineSummary(String),
    SwipeSummary(String),
    FullDescription(String),
    /// Comma-separated category list, as typed into a single input.
    Categories(String),
    AddTag(String),
    RemoveTag(String),
    Headline(bool),
    Published(bool),
    Language(Language),
    ImageUrl(String),
    SourceUrl(String),
}

impl EditableArticle {
    /// Apply an edit to this article.
    ///
    /// Returns `true` when the edit was recorded. Adding an empty or
    /// already-present tag is ignored and returns `false`, as does removing
    /// a tag that is not present.
    pub fn apply(&mut self, edit: ArticleEdit) -> bool {
        match edit {
            ArticleEdit::Title(value) => self.title = value,
            ArticleEdit::TwoLineSummary(value) => self.two_line_summary = value,
            ArticleEdit::FourLineSummary(value) => self.four_line_summary = value,
            ArticleEdit::SwipeSummary(value) => self.swipe_summary = value,
            ArticleEdit::FullDescription(value) => self.full_description = value,
            ArticleEdit::Categories(raw) => self.categories = parse_categories(&raw),
            ArticleEdit::AddTag(tag) => {
                let tag = tag.trim();
                if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
                    return false;
                }
                self.tags.push(tag.to_string());
            }
            ArticleEdit::RemoveTag(tag) => {
                let before = self.tags.len();
                self.tags.retain(|t| t != tag.trim());
                if self.tags.len() == before {
                    return false;
                }
            }
            ArticleEdit::Headline(value) => self.is_headline = value,
            ArticleEdit::Published(value) => self.is_published = value,
            ArticleEdit::Language(value) => self.language = value,
            ArticleEdit::ImageUrl(value) => self.image_url = value,
            ArticleEdit::SourceUrl(value) => self.source_url = value,
        }
        true
    }

    /// Build the partial-update body the storage API expects for this draft.
    pub fn to_update(&self) -> ArticleUpdate {
        ArticleUpdate {
            title: self.title.clone(),
            two_line_description: self.two_line_summary.clone(),
            four_line_description: self.four_line_summary.clone(),
            swipe_description: self.swipe_summary.clone(),
            content: self.full_description.clone(),
            category: self.categories.clone(),
            tags: self.tags.clone(),
            is_headline: self.is_headline,
            is_published: self.is_published,
            language: self.language.wire_code(),
            image_url: self.image_url.clone(),
            source: self.source_url.clone(),
        }
    }
}

/// Split a comma-separated category string, trimming entries and dropping
/// empty ones.
pub fn parse_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Characters that would change the request URL an article id is placed in.
const URL_RESERVED: &[char] = &['/', '?', '#'];

/// Reject empty article IDs, and IDs that would alter the request URL,
/// before they reach one.
pub fn validate_article_id(id: &str) -> Result<(), CoreError> {
    if id.trim().is_empty() {
        return Err(CoreError::Validation("article id must not be empty".into()));
    }
    if let Some(c) = id.chars().find(|c| URL_RESERVED.contains(c)) {
        return Err(CoreError::Validation(format!(
            "article id must not contain '{c}', got '{id}'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Storage update shape
// ---------------------------------------------------------------------------

/// Body of `PUT /article/{id}`, in the storage API's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdate {
    pub title: String,
    pub two_line_description: String,
    pub four_line_description: String,
    pub swipe_description: String,
    pub content: String,
    pub category: Vec<String>,
    pub tags: Vec<String>,
    pub is_headline: bool,
    pub is_published: bool,
    pub language: &'static str,
    pub image_url: String,
    pub source: String,
}
