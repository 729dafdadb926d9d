// Database-backed NotificationStore implementation
//
// This module implements the core NotificationStore and ChannelPreferences
// traits using Postgres as the backend. The notifications table is
// append-only with BIGSERIAL ids, which supplies the strictly increasing,
// globally unique id the cursor protocol depends on.

use async_trait::async_trait;
use std::collections::HashSet;

use taskping_core::{
    ChannelPreferences, EventData, NotificationEvent, NotificationStore, NotifyError, Result,
};

use crate::models::CreateNotification;
use crate::repositories::Database;

// ============================================================================
// DbNotificationStore - Stores queued notifications in Postgres
// ============================================================================

/// Database-backed notification store
#[derive(Clone)]
pub struct DbNotificationStore {
    db: Database,
}

impl DbNotificationStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationStore for DbNotificationStore {
    async fn insert(
        &self,
        user_id: i64,
        event_name: &str,
        event_data: EventData,
    ) -> Result<NotificationEvent> {
        let row = self
            .db
            .insert_notification(CreateNotification {
                user_id,
                event_name: event_name.to_string(),
                event_data,
            })
            .await
            .map_err(|e| NotifyError::store(e.to_string()))?;

        Ok(row.into())
    }

    async fn query_after(&self, user_id: i64, last_id: i64) -> Result<Vec<NotificationEvent>> {
        let rows = self
            .db
            .list_notifications_after(user_id, last_id)
            .await
            .map_err(|e| NotifyError::store(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_by_ids(&self, user_id: i64, ids: &[i64]) -> Result<bool> {
        self.db
            .delete_notifications(user_id, ids)
            .await
            .map_err(|e| NotifyError::store(e.to_string()))
    }
}

// ============================================================================
// DbChannelPreferences - Per-user channel opt-ins in Postgres
// ============================================================================

/// Database-backed channel preference lookup
#[derive(Clone)]
pub struct DbChannelPreferences {
    db: Database,
}

impl DbChannelPreferences {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChannelPreferences for DbChannelPreferences {
    async fn enabled_channels(&self, user_id: i64) -> Result<HashSet<String>> {
        let channels = self
            .db
            .list_user_channels(user_id)
            .await
            .map_err(|e| NotifyError::store(e.to_string()))?;

        Ok(channels.into_iter().collect())
    }
}
