// Delivery payload codec
//
// One SSE data frame carries one batch: the rendered items, the raw ids
// for acknowledgment, and the new client cursor. Clients consume the
// title field directly without further lookup, so the fallback chain
// here is part of the wire contract.

use serde::{Deserialize, Serialize};

use crate::event::{EventData, NotificationEvent};
use crate::render::EventRenderer;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Generic application label used when an event carries no project context.
pub const GENERIC_TITLE: &str = "Taskping";

/// One rendered notification as it crosses the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NotificationItem {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub url: String,
    /// Creation time as unix seconds
    pub date: i64,
}

/// One delivered batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NotificationPayload {
    pub items: Vec<NotificationItem>,
    /// Ids acknowledged (deleted) by the server after delivery
    pub ids: Vec<i64>,
    /// New client cursor: the highest id in the batch
    pub last_id: i64,
}

/// Resolve the display title for an event.
///
/// Priority: task-level project name, then event-level project name, then
/// the generic application label.
pub fn notification_title(data: &EventData) -> String {
    if let Some(name) = data.task.as_ref().and_then(|task| task.project_name.as_deref()) {
        return name.to_string();
    }

    if let Some(name) = data.project_name.as_deref() {
        return name.to_string();
    }

    GENERIC_TITLE.to_string()
}

/// Build the wire payload for one delivered batch.
///
/// `events` must already be in ascending id order (the store query
/// guarantees it), so the running `last_id` ends at the batch maximum.
pub fn build_payload(
    events: &[NotificationEvent],
    renderer: &dyn EventRenderer,
) -> NotificationPayload {
    let mut items = Vec::with_capacity(events.len());
    let mut ids = Vec::with_capacity(events.len());
    let mut last_id = 0;

    for event in events {
        ids.push(event.id);
        last_id = event.id;
        items.push(NotificationItem {
            id: event.id,
            title: notification_title(&event.event_data),
            body: renderer.body(&event.event_name, &event.event_data),
            url: renderer.url(&event.event_name, &event.event_data),
            date: event.created_at.timestamp(),
        });
    }

    NotificationPayload {
        items,
        ids,
        last_id,
    }
}
