// Producer route for queueing notifications
//
// Domain code (or an external producer service) POSTs here at
// event-emission time; the queued row is drained later by the owner's
// stream session.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use taskping_core::{EventData, NotificationStore};

use crate::auth::Authenticator;
use crate::common::ApiError;

/// App state for producer routes
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NotificationStore>,
    pub auth: Arc<dyn Authenticator>,
}

/// Create producer routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/notifications", post(create_notification))
        .with_state(state)
}

/// Request to queue one notification event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNotificationRequest {
    /// Recipient of the notification.
    pub user_id: i64,
    /// Symbolic classification of the domain event.
    #[schema(example = "task.comment.create")]
    pub event_name: String,
    /// Structured payload; shape depends on event_name.
    #[serde(default)]
    pub event_data: EventData,
}

/// Response carrying the id assigned by the store
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNotificationResponse {
    pub id: i64,
}

/// POST /v1/notifications - Queue a notification event for a user
#[utoipa::path(
    post,
    path = "/v1/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification queued", body = CreateNotificationResponse),
        (status = 403, description = "Not authenticated", body = crate::common::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::common::ErrorBody)
    ),
    tag = "notifications"
)]
pub async fn create_notification(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.authenticate(&headers, &jar).await?;

    let event = state
        .store
        .insert(request.user_id, &request.event_name, request.event_data)
        .await?;

    tracing::debug!(
        user_id = request.user_id,
        id = event.id,
        event_name = %event.event_name,
        "Queued notification"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateNotificationResponse { id: event.id }),
    ))
}
