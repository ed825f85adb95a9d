//! Domain types shared by the newsdesk lock client, session controller and
//! console editor.
//!
//! This crate has no internal dependencies so that every other crate can
//! reference the same article model, lock state and timing constants.

pub mod admin;
pub mod article;
pub mod error;
pub mod last_saved;
pub mod lock;
pub mod types;
