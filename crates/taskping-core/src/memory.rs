// In-memory implementations for examples and testing
//
// These implementations keep all data in memory, making them perfect for:
// - Unit tests of the stream session state machine
// - Quick prototyping without a database

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{NotifyError, Result};
use crate::event::{EventData, NotificationEvent};
use crate::traits::{ChannelPreferences, NotificationStore};

// ============================================================================
// InMemoryNotificationStore - Stores queued notifications in memory
// ============================================================================

/// In-memory notification store
///
/// Assigns ids from a process-local counter so id order matches insert
/// order, the same guarantee the Postgres store gives.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotificationStore {
    rows: Arc<RwLock<Vec<NotificationEvent>>>,
    next_id: Arc<AtomicI64>,
    fail_deletes: Arc<AtomicBool>,
}

impl InMemoryNotificationStore {
    /// Create a new in-memory notification store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `delete_by_ids` fail (useful for testing the
    /// at-least-once acknowledgment path)
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of rows currently queued across all users
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the queue is empty
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(
        &self,
        user_id: i64,
        event_name: &str,
        event_data: EventData,
    ) -> Result<NotificationEvent> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let event = NotificationEvent {
            id,
            user_id,
            event_name: event_name.to_string(),
            event_data,
            created_at: chrono::Utc::now(),
        };

        self.rows.write().await.push(event.clone());
        Ok(event)
    }

    async fn query_after(&self, user_id: i64, last_id: i64) -> Result<Vec<NotificationEvent>> {
        let rows = self.rows.read().await;
        let mut events: Vec<NotificationEvent> = rows
            .iter()
            .filter(|event| event.user_id == user_id && event.id > last_id)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.id);
        Ok(events)
    }

    async fn delete_by_ids(&self, user_id: i64, ids: &[i64]) -> Result<bool> {
        if ids.is_empty() {
            return Ok(true);
        }

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(NotifyError::store("delete rejected"));
        }

        self.rows
            .write()
            .await
            .retain(|event| event.user_id != user_id || !ids.contains(&event.id));
        Ok(true)
    }
}

// ============================================================================
// InMemoryChannelPreferences - Per-user channel opt-ins in memory
// ============================================================================

/// In-memory channel preference store
#[derive(Debug, Default, Clone)]
pub struct InMemoryChannelPreferences {
    channels: Arc<RwLock<HashMap<i64, HashSet<String>>>>,
}

impl InMemoryChannelPreferences {
    /// Create a new in-memory preference store
    pub fn new() -> Self {
        Self::default()
    }

    /// Opt a user into a channel
    pub async fn enable(&self, user_id: i64, channel: &str) {
        self.channels
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(channel.to_string());
    }
}

#[async_trait]
impl ChannelPreferences for InMemoryChannelPreferences {
    async fn enabled_channels(&self, user_id: i64) -> Result<HashSet<String>> {
        Ok(self
            .channels
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}
