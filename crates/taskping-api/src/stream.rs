// Notification stream HTTP route (SSE)
//
// One stream session per connection: poll the queue, heartbeat while
// idle, emit at most one batch, acknowledge it, then end the stream.
// The client reconnects with its cursor to resume. Bounding the session
// lifetime and ending after first delivery keeps per-connection resource
// holding small and recovery simple.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{
        sse::{Event as SseEvent, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::{convert::Infallible, sync::Arc};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use utoipa::IntoParams;

use taskping_core::{
    build_payload, ChannelPreferences, EventRenderer, NotificationPayload, NotificationStore,
    NotifyError, StreamConfig, PUSH_CHANNEL,
};

use crate::auth::Authenticator;
use crate::common::ApiError;

// ============================================
// App State and Routes
// ============================================

/// App state for the stream route
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NotificationStore>,
    pub prefs: Arc<dyn ChannelPreferences>,
    pub renderer: Arc<dyn EventRenderer>,
    pub auth: Arc<dyn Authenticator>,
    pub config: StreamConfig,
}

/// Create the stream route
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/notifications/stream", get(stream_notifications))
        .with_state(state)
}

// ============================================
// Query Parameters
// ============================================

/// Query parameters for the notification stream
#[derive(Debug, Deserialize, IntoParams)]
pub struct StreamQuery {
    /// Resume after this notification id. Absent or non-numeric values
    /// fall back to 0 (start of queue).
    #[param(example = "0")]
    pub last_id: Option<String>,
}

fn parse_cursor(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

// ============================================
// Stream session
// ============================================

/// One unit of stream output
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Frame {
    /// Comment-only keep-alive sent while the queue is empty
    Heartbeat,
    /// The single delivered batch; the session ends after sending it
    Batch(NotificationPayload),
}

/// Drive one stream session over the store.
///
/// Every exit path just drops the sender, which closes the connection;
/// a send failure means the client already went away.
pub(crate) async fn run_session(
    store: Arc<dyn NotificationStore>,
    renderer: Arc<dyn EventRenderer>,
    user_id: i64,
    cursor: i64,
    config: StreamConfig,
    tx: mpsc::Sender<Frame>,
) {
    let deadline = Instant::now() + config.session_lifetime;

    loop {
        let events = match store.query_after(user_id, cursor).await {
            Ok(events) => events,
            Err(e) => {
                // Nothing was delivered or deleted yet, so the client
                // reconnects with the same cursor and loses nothing.
                tracing::error!(user_id, error = %e, "Poll failed, ending stream session");
                return;
            }
        };

        if !events.is_empty() {
            let count = events.len();
            let payload = build_payload(&events, renderer.as_ref());
            let ids = payload.ids.clone();
            let last_id = payload.last_id;

            if tx.send(Frame::Batch(payload)).await.is_err() {
                // Client disconnected before the batch went out; rows
                // stay queued for the next session.
                return;
            }

            tracing::info!(user_id, count, last_id, "Delivered notification batch");

            // Best-effort acknowledgment: on failure the same batch is
            // redelivered on the next connect (at-least-once delivery).
            if let Err(e) = store.delete_by_ids(user_id, &ids).await {
                tracing::warn!(user_id, error = %e, "Failed to acknowledge delivered notifications");
            }

            return;
        }

        if Instant::now() >= deadline {
            tracing::debug!(user_id, "Stream session lifetime elapsed");
            return;
        }

        if tx.send(Frame::Heartbeat).await.is_err() {
            return;
        }

        tokio::time::sleep(config.poll_interval).await;
    }
}

fn to_sse_event(frame: Frame) -> SseEvent {
    match frame {
        Frame::Heartbeat => SseEvent::default().comment("ping"),
        Frame::Batch(payload) => {
            let json = serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string());
            SseEvent::default().event("notifications").data(json)
        }
    }
}

// ============================================
// HTTP Handler
// ============================================

/// GET /v1/notifications/stream - Stream queued notifications (SSE)
///
/// Emits comment heartbeats while idle and at most one `notifications`
/// event, then closes; reconnect with `?last_id=` to resume.
#[utoipa::path(
    get,
    path = "/v1/notifications/stream",
    params(StreamQuery),
    responses(
        (status = 200, description = "Notification stream", content_type = "text/event-stream"),
        (status = 204, description = "Push channel disabled for this user"),
        (status = 403, description = "Not authenticated", body = crate::common::ErrorBody)
    ),
    tag = "notifications"
)]
pub async fn stream_notifications(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = state.auth.authenticate(&headers, &jar).await?;

    let channels = state.prefs.enabled_channels(user.user_id).await?;
    if !channels.contains(PUSH_CHANNEL) {
        return Err(NotifyError::ChannelDisabled.into());
    }

    let cursor = parse_cursor(query.last_id.as_deref());
    tracing::info!(user_id = user.user_id, cursor, "Starting notification stream");

    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(run_session(
        state.store.clone(),
        state.renderer.clone(),
        user.user_id,
        cursor,
        state.config.clone(),
        tx,
    ));

    let stream = ReceiverStream::new(rx).map(|frame| Ok::<_, Infallible>(to_sse_event(frame)));

    // Keep-alive is our own heartbeat frame; the headers tell proxies not
    // to buffer or cache the stream.
    Ok((
        [
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        Sse::new(stream),
    )
        .into_response())
}

// ============================================
// Tests
// ============================================
