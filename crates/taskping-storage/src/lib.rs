// Postgres storage layer with sqlx
//
// This crate provides database implementations for core traits:
// - DbNotificationStore: implements NotificationStore for the per-user queue
// - DbChannelPreferences: implements ChannelPreferences for channel opt-ins

pub mod auth_tokens;
pub mod models;
pub mod notification_store;
pub mod repositories;

pub use auth_tokens::{generate_session_token, hash_session_token, GeneratedToken};
pub use models::*;
pub use notification_store::{DbChannelPreferences, DbNotificationStore};
pub use repositories::Database;
