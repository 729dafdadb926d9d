// Notification event entity
//
// One row in the per-user notification queue. Ids are assigned by the
// store and strictly increase per insert; id order is the only ordering
// guarantee the pipeline gives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Channel identifier for the SSE push stream.
///
/// Must appear in a user's enabled channels before a stream session is
/// allowed to open.
pub const PUSH_CHANNEL: &str = "push";

/// NotificationEvent - queued notification record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NotificationEvent {
    pub id: i64,
    pub user_id: i64,
    pub event_name: String,
    pub event_data: EventData,
    pub created_at: DateTime<Utc>,
}

/// Structured event payload.
///
/// The fields the pipeline resolves titles and URLs from are typed;
/// producers may attach arbitrary extra fields, which round-trip through
/// the flattened map untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentData>,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: Map<String, Value>,
}

/// Task context carried by task-related events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TaskData {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: Map<String, Value>,
}

/// Comment context carried by comment-related events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CommentData {
    pub id: i64,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_data_roundtrip_keeps_extra_fields() {
        let raw = json!({
            "project_name": "Backend",
            "task": {"id": 12, "title": "Fix login", "column": "Doing"},
            "author": "alice"
        });

        let data: EventData = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(data.project_name.as_deref(), Some("Backend"));
        assert_eq!(data.task.as_ref().unwrap().id, 12);
        assert_eq!(data.task.as_ref().unwrap().extra["column"], "Doing");
        assert_eq!(data.extra["author"], "alice");

        let back = serde_json::to_value(&data).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_event_data_tolerates_empty_object() {
        let data: EventData = serde_json::from_str("{}").unwrap();
        assert!(data.project_name.is_none());
        assert!(data.task.is_none());
        assert!(data.comment.is_none());
    }
}
