//! Console observer, status rendering and the command loop.

use std::io::Write;

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

use newsdesk_core::last_saved::format_last_saved;
use newsdesk_core::types::Timestamp;
use newsdesk_session::{
    EditSession, ExitReason, SessionError, SessionExit, SessionNotice, SessionObserver,
    SessionPhase, SessionSnapshot,
};

use crate::command::{Command, HELP};

/// Prints session reports to stdout and publishes the exit on a watch
/// channel so the command loop can stop waiting for input.
pub struct ConsoleObserver {
    exits: watch::Sender<Option<SessionExit>>,
}

impl ConsoleObserver {
    pub fn new() -> (Self, watch::Receiver<Option<SessionExit>>) {
        let (exits, rx) = watch::channel(None);
        (Self { exits }, rx)
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_exit(&self, exit: &SessionExit) {
        if exit.reason.requires_acknowledgement() {
            println!("\n!! {}", exit.message);
        } else {
            println!("{}", exit.message);
        }
        self.exits.send_replace(Some(exit.clone()));
    }

    fn on_notice(&self, notice: &SessionNotice) {
        println!("{}", notice.message());
    }
}

/// Multi-line summary of a session for the `status` command.
pub fn render_status(snapshot: &SessionSnapshot, now: Timestamp) -> String {
    let draft = &snapshot.draft;
    let lock = &snapshot.lock;

    let lock_line = if lock.held {
        "held by you".to_string()
    } else if lock.acquiring {
        "acquiring".to_string()
    } else if let Some(owner) = &lock.owner_id {
        format!("locked by {owner}")
    } else {
        "not held".to_string()
    };

    let saved_line = snapshot
        .last_saved
        .map(|saved_at| format_last_saved(saved_at, now))
        .unwrap_or_else(|| "never".to_string());

    format!(
        "Article {id}: {title}\n\
         Lock: {lock_line}\n\
         Phase: {phase:?}\n\
         Unsaved changes: {dirty}\n\
         Last saved: {saved_line}\n\
         Tags: {tags}\n\
         Headline: {headline}, Published: {published}, Language: {language}",
        id = draft.id,
        title = draft.title,
        phase = snapshot.phase,
        dirty = if snapshot.has_unsaved_changes { "yes" } else { "no" },
        tags = draft.tags.join(", "),
        headline = draft.is_headline,
        published = draft.is_published,
        language = draft.language.wire_code(),
    )
}

/// Process exit code for the phase a session ended in.
pub fn exit_code(phase: &SessionPhase) -> i32 {
    match phase {
        SessionPhase::Exited(ExitReason::Saved)
        | SessionPhase::Exited(ExitReason::Cancelled)
        | SessionPhase::Exited(ExitReason::NavigatedAway) => 0,
        SessionPhase::Exited(ExitReason::AuthExpired) => 3,
        SessionPhase::Exited(_) => 2,
        _ => 1,
    }
}

/// Run commands from `input` against `session` until it exits.
///
/// A forced exit (lock lost, expired login) reported through `exits` ends
/// the loop without waiting for another line. End of input cancels the
/// session, and so does a console I/O error before it is returned.
pub async fn drive<R, W>(
    session: &mut EditSession,
    input: R,
    out: &mut W,
    exits: &mut watch::Receiver<Option<SessionExit>>,
) -> std::io::Result<SessionPhase>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Err(e) = read_commands(session, input, out, exits).await {
        tracing::warn!(article_id = %session.article_id(), error = %e, "Console failed, cancelling");
        session.cancel().await;
        return Err(e);
    }

    Ok(session.phase().await)
}

async fn read_commands<R, W>(
    session: &mut EditSession,
    input: R,
    out: &mut W,
    exits: &mut watch::Receiver<Option<SessionExit>>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        tokio::select! {
            changed = exits.changed() => {
                if changed.is_err() || exits.borrow().is_some() {
                    return Ok(());
                }
            }
            line = lines.next_line() => match line? {
                Some(line) => {
                    if execute(session, &line, out).await? {
                        return Ok(());
                    }
                }
                None => {
                    tracing::info!(article_id = %session.article_id(), "Input closed, cancelling");
                    session.cancel().await;
                    return Ok(());
                }
            },
        }
    }
}

/// Apply one line. Returns `true` once the session has exited.
async fn execute<W: Write>(
    session: &mut EditSession,
    line: &str,
    out: &mut W,
) -> std::io::Result<bool> {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(e) => {
            writeln!(out, "{e}")?;
            return Ok(false);
        }
    };

    match command {
        Command::Empty => {}
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Status => {
            let snapshot = session.snapshot().await;
            writeln!(out, "{}", render_status(&snapshot, Utc::now()))?;
        }
        Command::Edit(edit) => match session.edit(edit).await {
            Ok(true) => {}
            Ok(false) => writeln!(out, "(no change)")?,
            Err(e) => writeln!(out, "{e}")?,
        },
        Command::Save => {
            if let Err(e) = session.save().await {
                tracing::debug!(error = %e, "Save command failed");
                if let SessionError::NotEditing(_) = e {
                    writeln!(out, "{e}")?;
                }
            }
        }
        Command::Unlock => match session.manual_unlock().await {
            Ok(()) => writeln!(
                out,
                "Lock released. You can keep editing, but saves may be rejected."
            )?,
            Err(e) => writeln!(out, "{e}")?,
        },
        Command::Cancel => session.cancel().await,
        Command::Leave { confirmed } => match session.leave(confirmed).await {
            Ok(()) => {}
            Err(SessionError::UnsavedChanges) => writeln!(
                out,
                "You have unsaved changes. Type `leave!` to discard them, or `save`."
            )?,
            Err(e) => writeln!(out, "{e}")?,
        },
    }

    Ok(session.phase().await.is_exited())
}
