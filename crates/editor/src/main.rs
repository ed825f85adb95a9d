//! `newsdesk-editor` -- edit one newsdesk article from the terminal.
//!
//! Logs in, takes the article's editing lock and reads commands from stdin
//! until the article is saved, the edit is cancelled, or the lock is lost.
//! Ctrl-C cancels the edit and releases the lock.
//!
//! # Usage
//!
//! ```text
//! newsdesk-editor <article-id>
//! ```
//!
//! See [`EditorConfig::from_env`] for the environment variables read.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsdesk_client::NewsdeskApi;
use newsdesk_editor::command::HELP;
use newsdesk_editor::{drive, exit_code, render_status, ConsoleObserver, Credentials, EditorConfig};
use newsdesk_session::{Collaborators, EditSession};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsdesk_editor=info,newsdesk_session=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = ?e, "newsdesk-editor failed");
            1
        }
    };

    // Stdin is read on a blocking thread that would otherwise hold the
    // runtime open.
    std::process::exit(code);
}

async fn run() -> anyhow::Result<i32> {
    let config = EditorConfig::from_env(std::env::args().skip(1))?;

    tracing::info!(
        article_id = %config.article_id,
        api_base = %config.api.base_url,
        heartbeat_secs = config.session.heartbeat_interval.as_secs(),
        autosave_secs = config.session.autosave_interval.as_secs(),
        "Starting newsdesk-editor",
    );

    let api = NewsdeskApi::new(&config.api).context("Failed to build API client")?;

    let (token, admin_id) = match config.credentials {
        Credentials::Token { token, admin_id } => (token, admin_id),
        Credentials::Password {
            identifier,
            password,
        } => {
            let session = api
                .login(&identifier, &password)
                .await
                .context("Login failed")?;
            tracing::info!(
                admin_id = %session.admin.id,
                role = ?session.admin.role,
                "Logged in"
            );
            (session.token, session.admin.id)
        }
    };

    let (observer, mut exits) = ConsoleObserver::new();
    let collaborators = Collaborators::over_http(api.with_token(token), Arc::new(observer));

    let mut session = EditSession::open(
        config.article_id.clone(),
        admin_id,
        collaborators,
        config.session.clone(),
    )
    .await
    .with_context(|| format!("Failed to open article {}", config.article_id))?;

    println!("{}\n", render_status(&session.snapshot().await, Utc::now()));
    println!("{HELP}");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    let phase = tokio::select! {
        // `drive` cancels the session itself before returning an I/O error.
        phase = drive(&mut session, stdin, &mut stdout, &mut exits) => {
            phase.context("Console I/O failed")?
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, cancelling edit");
            session.cancel().await;
            session.phase().await
        }
    };

    Ok(exit_code(&phase))
}
