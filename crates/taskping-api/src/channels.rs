// Notification channel preference routes
//
// The stream session only checks membership of the "push" channel; these
// routes are how a user flips that switch.

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use taskping_core::NotifyError;
use taskping_storage::Database;

use crate::auth::Authenticator;
use crate::common::ApiError;

/// App state for channel preference routes
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<dyn Authenticator>,
}

/// Create channel preference routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/me/channels", get(get_my_channels).put(set_my_channels))
        .with_state(state)
}

/// Channel selection for the calling user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelsResponse {
    /// Channel names the user has opted into.
    #[schema(example = json!(["push"]))]
    pub channels: Vec<String>,
}

/// Request replacing the caller's channel selection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateChannelsRequest {
    pub channels: Vec<String>,
}

/// GET /v1/me/channels - Channels the calling user has enabled
#[utoipa::path(
    get,
    path = "/v1/me/channels",
    responses(
        (status = 200, description = "Enabled channels", body = ChannelsResponse),
        (status = 403, description = "Not authenticated", body = crate::common::ErrorBody)
    ),
    tag = "channels"
)]
pub async fn get_my_channels(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Json<ChannelsResponse>, ApiError> {
    let user = state.auth.authenticate(&headers, &jar).await?;

    let channels = state
        .db
        .list_user_channels(user.user_id)
        .await
        .map_err(|e| NotifyError::store(e.to_string()))?;

    Ok(Json(ChannelsResponse { channels }))
}

/// PUT /v1/me/channels - Replace the calling user's channel selection
#[utoipa::path(
    put,
    path = "/v1/me/channels",
    request_body = UpdateChannelsRequest,
    responses(
        (status = 200, description = "Updated channels", body = ChannelsResponse),
        (status = 403, description = "Not authenticated", body = crate::common::ErrorBody)
    ),
    tag = "channels"
)]
pub async fn set_my_channels(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(request): Json<UpdateChannelsRequest>,
) -> Result<Json<ChannelsResponse>, ApiError> {
    let user = state.auth.authenticate(&headers, &jar).await?;

    state
        .db
        .set_user_channels(user.user_id, &request.channels)
        .await
        .map_err(|e| NotifyError::store(e.to_string()))?;

    let channels = state
        .db
        .list_user_channels(user.user_id)
        .await
        .map_err(|e| NotifyError::store(e.to_string()))?;

    tracing::info!(user_id = user.user_id, ?channels, "Updated notification channels");

    Ok(Json(ChannelsResponse { channels }))
}
