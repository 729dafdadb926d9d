// Client stream agent
//
// Owns the reconnect loop: open the stream with the persisted cursor,
// apply each delivered batch to the presenter, persist the new cursor
// once per batch, and after any stream end or error reconnect on a fixed
// delay. No backoff growth and no retry ceiling; the bounded server
// session already caps what an idle client costs.

use anyhow::Context;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskping_core::{NotificationPayload, NotifyError, Result};

use crate::cursor::CursorStore;
use crate::presenter::Presenter;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3000);

/// Client connection settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub session_token: String,
    pub retry_delay: Duration,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>, session_token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            session_token: session_token.into(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Load from TASKPING_SERVER_URL / TASKPING_SESSION_TOKEN, with an
    /// optional TASKPING_RETRY_DELAY_MS override.
    pub fn from_env() -> anyhow::Result<Self> {
        let server_url = std::env::var("TASKPING_SERVER_URL")
            .context("TASKPING_SERVER_URL environment variable required")?;
        let session_token = std::env::var("TASKPING_SESSION_TOKEN")
            .context("TASKPING_SESSION_TOKEN environment variable required")?;

        let mut config = Self::new(server_url, session_token);
        if let Some(millis) = std::env::var("TASKPING_RETRY_DELAY_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            config.retry_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

/// Outcome of a single connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The server delivered (or idled to its deadline) and closed the stream
    StreamEnded,
    /// The server reported the push channel disabled for this user
    ChannelDisabled,
}

/// Reconnecting SSE consumer for one user's notification stream
pub struct StreamAgent {
    config: ClientConfig,
    client: reqwest::Client,
    cursor: CursorStore,
    presenter: Arc<Mutex<Presenter>>,
}

impl StreamAgent {
    pub fn new(config: ClientConfig, cursor: CursorStore, presenter: Arc<Mutex<Presenter>>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            cursor,
            presenter,
        }
    }

    /// Reconnect forever with a fixed delay.
    ///
    /// Every server-side termination (delivery, idle deadline, error)
    /// lands back here; the persisted cursor makes each reopen resume
    /// where the last applied batch ended.
    pub async fn run(mut self) {
        loop {
            let cursor = self.cursor.load();
            match self.run_once(cursor).await {
                Ok(RunOutcome::StreamEnded) => {
                    tracing::debug!("Stream closed, reconnecting");
                }
                Ok(RunOutcome::ChannelDisabled) => {
                    tracing::info!("Push channel disabled, retrying later");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Stream error, reconnecting");
                }
            }

            tokio::time::sleep(self.config.retry_delay).await;
        }
    }

    /// One connection: open with the given cursor, drain events until the
    /// server closes the stream.
    pub async fn run_once(&mut self, last_id: i64) -> Result<RunOutcome> {
        let url = stream_url(&self.config.server_url, last_id);
        tracing::debug!(%url, "Opening notification stream");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .bearer_auth(&self.config.session_token)
            .send()
            .await
            .map_err(|e| NotifyError::transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(RunOutcome::ChannelDisabled);
        }
        if !response.status().is_success() {
            return Err(NotifyError::transport(format!(
                "Unexpected status {}",
                response.status()
            )));
        }

        let mut stream = response.bytes_stream().eventsource();
        while let Some(event) = stream.next().await {
            let event = event.map_err(|e| NotifyError::transport(e.to_string()))?;
            if event.event != "notifications" {
                continue;
            }
            self.apply_batch(&event.data)?;
        }

        Ok(RunOutcome::StreamEnded)
    }

    /// Present a decoded batch, then persist the cursor once for the
    /// whole batch so a crash mid-batch never records a partial apply.
    fn apply_batch(&mut self, data: &str) -> Result<()> {
        let payload: NotificationPayload =
            serde_json::from_str(data).map_err(|e| NotifyError::codec(e.to_string()))?;

        // Empty batches never occur per protocol, but are a no-op rather
        // than an error if they do.
        if payload.items.is_empty() {
            return Ok(());
        }

        {
            let mut presenter = self.presenter.lock().unwrap();
            for item in &payload.items {
                presenter.present(item);
            }
        }

        if payload.last_id > 0 {
            self.cursor.save(payload.last_id)?;
        }

        tracing::info!(
            count = payload.items.len(),
            last_id = payload.last_id,
            "Applied notification batch"
        );

        Ok(())
    }
}

fn stream_url(base: &str, last_id: i64) -> String {
    let endpoint = format!("{}/v1/notifications/stream", base.trim_end_matches('/'));

    if last_id > 0 {
        format!("{}?last_id={}", endpoint, last_id)
    } else {
        endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::presenter::tests::recording_presenter;

    #[test]
    fn test_stream_url_omits_zero_cursor() {
        assert_eq!(
            stream_url("http://localhost:9000", 0),
            "http://localhost:9000/v1/notifications/stream"
        );
        assert_eq!(
            stream_url("http://localhost:9000/", 7),
            "http://localhost:9000/v1/notifications/stream?last_id=7"
        );
    }

    fn sse_body(payload: &serde_json::Value) -> String {
        format!("event: notifications\ndata: {}\n\n", payload)
    }

    struct TestHandles {
        cursor: CursorStore,
        recorded: Arc<Mutex<crate::presenter::tests::Recorded>>,
        _dir: tempfile::TempDir,
    }

    fn agent_for(server: &MockServer, granted: bool) -> (StreamAgent, TestHandles) {
        let dir = tempfile::tempdir().unwrap();
        let cursor = CursorStore::new(dir.path().join("last_id"));
        let (presenter, recorded) = recording_presenter(granted, false);

        let agent = StreamAgent::new(
            ClientConfig::new(server.uri(), "tp_test"),
            cursor.clone(),
            Arc::new(Mutex::new(presenter)),
        );

        (
            agent,
            TestHandles {
                cursor,
                recorded,
                _dir: dir,
            },
        )
    }

    #[tokio::test]
    async fn test_run_once_applies_batch_and_persists_cursor() {
        let server = MockServer::start().await;
        let payload = json!({
            "items": [
                {"id": 5, "title": "Backend", "body": "Task create: A", "url": "/tasks/1", "date": 1_700_000_000},
                {"id": 7, "title": "Backend", "body": "Task update: B", "url": "/tasks/2", "date": 1_700_000_100}
            ],
            "ids": [5, 7],
            "last_id": 7
        });

        Mock::given(method("GET"))
            .and(path("/v1/notifications/stream"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(sse_body(&payload), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let (mut agent, handles) = agent_for(&server, true);
        let outcome = agent.run_once(0).await.unwrap();

        assert_eq!(outcome, RunOutcome::StreamEnded);
        assert_eq!(handles.cursor.load(), 7);

        let recorded = handles.recorded.lock().unwrap();
        assert_eq!(recorded.alerts, vec!["Backend", "Backend"]);
        assert_eq!(recorded.badge_counts, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_run_once_sends_cursor_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/notifications/stream"))
            .and(query_param("last_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(": ping\n\n", "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let (mut agent, handles) = agent_for(&server, true);
        let outcome = agent.run_once(42).await.unwrap();

        // Heartbeat-only stream: nothing presented, cursor untouched.
        assert_eq!(outcome, RunOutcome::StreamEnded);
        assert_eq!(handles.cursor.load(), 0);
        assert!(handles.recorded.lock().unwrap().toasts.is_empty());
    }

    #[tokio::test]
    async fn test_empty_items_payload_is_a_noop() {
        let server = MockServer::start().await;
        let payload = json!({"items": [], "ids": [], "last_id": 0});

        Mock::given(method("GET"))
            .and(path("/v1/notifications/stream"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(sse_body(&payload), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let (mut agent, handles) = agent_for(&server, true);
        let outcome = agent.run_once(0).await.unwrap();

        assert_eq!(outcome, RunOutcome::StreamEnded);
        assert_eq!(handles.cursor.load(), 0);
        assert!(handles.recorded.lock().unwrap().toasts.is_empty());
    }

    #[tokio::test]
    async fn test_channel_disabled_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/notifications/stream"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let (mut agent, _handles) = agent_for(&server, true);
        assert_eq!(agent.run_once(0).await.unwrap(), RunOutcome::ChannelDisabled);
    }

    #[tokio::test]
    async fn test_forbidden_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/notifications/stream"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let (mut agent, _handles) = agent_for(&server, true);
        let error = agent.run_once(0).await.unwrap_err();
        assert!(matches!(error, NotifyError::Transport(_)));
    }
}
