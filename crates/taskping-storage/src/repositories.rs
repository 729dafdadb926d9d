// Repository layer for database operations

use anyhow::Result;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations (idempotent)
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    // ============================================
    // Notification queue (append-only, delete-on-ack)
    // ============================================

    pub async fn insert_notification(&self, input: CreateNotification) -> Result<NotificationRow> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (user_id, event_name, event_data)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, event_name, event_data, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.event_name)
        .bind(Json(&input.event_data))
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_notifications_after(
        &self,
        user_id: i64,
        last_id: i64,
    ) -> Result<Vec<NotificationRow>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, event_name, event_data, created_at
            FROM notifications
            WHERE user_id = $1 AND id > $2
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .bind(last_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete delivered notifications. The user_id predicate is a safety
    /// net; ids are globally unique.
    pub async fn delete_notifications(&self, user_id: i64, ids: &[i64]) -> Result<bool> {
        if ids.is_empty() {
            return Ok(true);
        }

        sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE user_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .execute(&self.pool)
        .await?;

        // Rows already acknowledged by a concurrent session are a no-op,
        // not a failure.
        Ok(true)
    }

    // ============================================
    // Auth sessions (token stored hashed)
    // ============================================

    pub async fn create_auth_session(&self, input: CreateAuthSession) -> Result<AuthSessionRow> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            INSERT INTO auth_sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token_hash, user_id, expires_at, created_at
            "#,
        )
        .bind(&input.token_hash)
        .bind(input.user_id)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_auth_session(&self, token_hash: &str) -> Result<Option<AuthSessionRow>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT token_hash, user_id, expires_at, created_at
            FROM auth_sessions
            WHERE token_hash = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Notification channel preferences
    // ============================================

    pub async fn list_user_channels(&self, user_id: i64) -> Result<Vec<String>> {
        let channels = sqlx::query_scalar::<_, String>(
            r#"
            SELECT channel
            FROM user_channels
            WHERE user_id = $1
            ORDER BY channel
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }

    pub async fn set_user_channels(&self, user_id: i64, channels: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_channels WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for channel in channels {
            sqlx::query(
                r#"
                INSERT INTO user_channels (user_id, channel)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(channel)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
