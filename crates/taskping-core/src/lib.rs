// Notification Pipeline Abstractions
//
// This crate provides the DB-agnostic core of a per-user, cursor-based
// notification delivery pipeline (queued events, one SSE batch per
// connection, delete-on-ack).
//
// Key design decisions:
// - Uses traits (NotificationStore, ChannelPreferences) for pluggable backends
// - event_data is typed (EventData) so the title/URL fallback chain is exhaustive
// - The wire payload codec lives here and is shared by server and client
// - Stream timing is explicit per-session configuration, never process-global state
// - Error handling distinguishes retryable store failures from auth/opt-out terminations

// Domain entity types
pub mod event;

pub mod config;
pub mod error;
pub mod payload;
pub mod render;
pub mod traits;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use config::StreamConfig;
pub use error::{NotifyError, Result};
pub use event::{CommentData, EventData, NotificationEvent, TaskData, PUSH_CHANNEL};
pub use memory::{InMemoryChannelPreferences, InMemoryNotificationStore};
pub use payload::{build_payload, notification_title, NotificationItem, NotificationPayload, GENERIC_TITLE};
pub use render::{DefaultRenderer, EventRenderer};
pub use traits::{ChannelPreferences, NotificationStore};
