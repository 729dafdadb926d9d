// Pluggable backend traits
//
// The stream session talks to persistence and user preferences through
// these seams; the Postgres implementations live in taskping-storage and
// in-memory implementations in memory.rs back tests and examples.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::Result;
use crate::event::{EventData, NotificationEvent};

/// Append-only per-user notification queue.
///
/// Implementations must assign strictly increasing ids and make inserts
/// visible to subsequent queries immediately. Rows are never mutated,
/// only inserted and later deleted on acknowledgment.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Append one event for a user.
    async fn insert(
        &self,
        user_id: i64,
        event_name: &str,
        event_data: EventData,
    ) -> Result<NotificationEvent>;

    /// All events for a user with id greater than `last_id`, ascending by id.
    async fn query_after(&self, user_id: i64, last_id: i64) -> Result<Vec<NotificationEvent>>;

    /// Acknowledge delivered events by deleting them.
    ///
    /// An empty id set is a no-op success. Scoped to `user_id` even
    /// though ids are globally unique.
    async fn delete_by_ids(&self, user_id: i64, ids: &[i64]) -> Result<bool>;
}

/// Per-user delivery channel selection.
#[async_trait]
pub trait ChannelPreferences: Send + Sync {
    /// Channel names the user has opted into.
    async fn enabled_channels(&self, user_id: i64) -> Result<HashSet<String>>;
}
