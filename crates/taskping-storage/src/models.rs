// Database models (internal, may differ from the wire DTOs)

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use taskping_core::{EventData, NotificationEvent};

// ============================================
// Notification queue models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: i64,
    pub event_name: String,
    pub event_data: Json<EventData>,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for NotificationEvent {
    fn from(row: NotificationRow) -> Self {
        NotificationEvent {
            id: row.id,
            user_id: row.user_id,
            event_name: row.event_name,
            event_data: row.event_data.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: i64,
    pub event_name: String,
    pub event_data: EventData,
}

// ============================================
// Auth session models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct AuthSessionRow {
    pub token_hash: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAuthSession {
    pub token_hash: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}
