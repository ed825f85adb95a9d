//! REST client for the newsdesk admin API.
//!
//! Wraps the lock, article and login endpoints with [`reqwest`], maps the
//! API's wire shapes onto `newsdesk-core` types in one place, and exposes
//! the [`LockClient`] and [`ArticleStore`] seams the edit session drives.

pub mod api;
pub mod auth;
pub mod collaborator;
pub mod config;
pub mod error;
mod wire;

pub use api::NewsdeskApi;
pub use collaborator::{AcquireOutcome, ArticleStore, LockClient, ReleaseOutcome};
pub use config::ApiConfig;
pub use error::ApiError;
