//! Console front end for a single article edit session.
//!
//! Reads one command per line, applies it to an [`EditSession`] and prints
//! whatever the session reports through the [`ConsoleObserver`].
//!
//! [`EditSession`]: newsdesk_session::EditSession
//! [`ConsoleObserver`]: console::ConsoleObserver

pub mod command;
pub mod config;
pub mod console;

pub use command::{Command, CommandError};
pub use config::{ConfigError, Credentials, EditorConfig};
pub use console::{drive, exit_code, render_status, ConsoleObserver};
