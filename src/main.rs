//! Terminal front-end for a conversation session
//!
//! Reads one turn per line from stdin and prints the assistant's turns as
//! they land. Logs go to stderr as JSON so stdout stays a clean transcript.

use chat_session::format::speaker_label;
use chat_session::{
    BackendConfig, HttpBackend, LoggingBackend, Route, SessionController, Speaker, SubmitOutcome,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_session=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = BackendConfig::from_env()?;
    tracing::info!(
        general = %config.endpoint(Route::General),
        constrained = %config.endpoint(Route::ConstrainedReply),
        timeout_secs = config.timeout.as_secs(),
        "Backend configured"
    );

    let backend = LoggingBackend::new(Arc::new(HttpBackend::new(&config)?));
    let session = SessionController::new(backend);
    let transcript = session.transcript();

    println!("Tell me what you are looking for. /reset starts over, /quit exits.");

    let mut seen = 0;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/reset" => {
                session.reset();
                seen = 0;
                println!("-- new conversation --");
                continue;
            }
            _ => {}
        }

        if let SubmitOutcome::Rejected(reason) = session.submit(&line).await {
            println!("({reason})");
        }

        for turn in transcript.snapshot_after(seen) {
            seen = turn.sequence;
            if turn.speaker != Speaker::User {
                println!("{}: {}", speaker_label(turn.speaker), turn.text);
            }
        }
    }

    tracing::info!(session_id = %session.id(), "Session closed");
    Ok(())
}
