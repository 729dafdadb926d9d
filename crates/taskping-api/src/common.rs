// Common DTOs and error mapping for the public API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use taskping_core::NotifyError;

/// Structured error body returned on non-stream paths.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Access Forbidden")]
    pub message: String,
}

/// API-level error wrapper around the pipeline error type.
///
/// The auth and opt-out terminations carry the original wire contract:
/// 403 for an unauthenticated caller, 204 with a distinct message when
/// the user has the push channel disabled.
#[derive(Debug)]
pub struct ApiError(pub NotifyError);

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            NotifyError::Forbidden => (StatusCode::FORBIDDEN, "Access Forbidden".to_string()),
            NotifyError::ChannelDisabled => {
                (StatusCode::NO_CONTENT, "Notifications disabled".to_string())
            }
            err => {
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
