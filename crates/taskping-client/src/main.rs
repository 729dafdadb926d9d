// Taskping client daemon
//
// Connects to the notification stream and renders deliveries in the
// terminal. Pressing Enter marks everything as seen (the terminal
// stand-in for the window regaining focus).

use anyhow::Result;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskping_client::{
    ClientConfig, CursorStore, Presenter, StreamAgent, TerminalAlertSink, TerminalBadgeSink,
    TerminalSoundSink, TerminalToastSink,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskping_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    let cursor = CursorStore::default_path()?;
    tracing::info!(cursor = cursor.load(), "Resuming from persisted cursor");

    // Desktop alerts honor a previously recorded grant; set
    // TASKPING_DESKTOP_ALERTS=0 to run without them.
    let alerts_granted = std::env::var("TASKPING_DESKTOP_ALERTS")
        .map(|value| value != "0" && value.to_lowercase() != "false")
        .unwrap_or(true);

    let presenter = Arc::new(Mutex::new(Presenter::new(
        Box::new(TerminalAlertSink::new(alerts_granted)),
        Box::new(TerminalToastSink::new()),
        Box::new(TerminalBadgeSink::new("Taskping")),
        Box::new(TerminalSoundSink::new()),
    )));

    // Enter clears the unseen badge, like a page regaining focus.
    let focus_presenter = presenter.clone();
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(_)) = lines.next_line().await {
            focus_presenter.lock().unwrap().clear_unseen();
        }
    });

    let agent = StreamAgent::new(config, cursor, presenter);
    agent.run().await;

    Ok(())
}
