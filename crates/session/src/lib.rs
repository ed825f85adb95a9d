//! Article edit sessions: lock acquisition, heartbeat re-validation,
//! autosave and the session state machine that ties them together.
//!
//! An [`EditSession`] owns two [`PeriodicTask`] timers that only run while
//! the session holds the article lock. Exits and user-facing notices are
//! reported through the [`SessionObserver`] supplied when the session is
//! opened.

mod autosave;
mod context;
pub mod config;
pub mod controller;
pub mod error;
mod heartbeat;
pub mod observer;
pub mod state;
pub mod timer;

pub use config::SessionConfig;
pub use controller::{Collaborators, EditSession, NavigationGuard};
pub use error::SessionError;
pub use observer::{ExitReason, SessionExit, SessionNotice, SessionObserver};
pub use state::{SessionPhase, SessionSnapshot};
pub use timer::{PeriodicTask, Tick, TimerState};
