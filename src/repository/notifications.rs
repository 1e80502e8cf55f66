//! Notifications repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::AppResult,
    models::notification::{NewNotification, Notification},
};

#[derive(Clone)]
pub struct NotificationsRepository {
    pool: Pool<Postgres>,
}

impl NotificationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, notification: &NewNotification) -> AppResult<Notification> {
        let created = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, notification_type, title, message, related_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(notification.user_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.related_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Notifications of a user, newest first
    pub async fn list_for_user(&self, user_id: i32, is_read: Option<bool>) -> AppResult<Vec<Notification>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM notifications WHERE user_id = ");
        builder.push_bind(user_id);

        if let Some(is_read) = is_read {
            builder.push(" AND is_read = ").push_bind(is_read);
        }

        builder.push(" ORDER BY created_at DESC, notification_id DESC");

        let notifications = builder
            .build_query_as::<Notification>()
            .fetch_all(&self.pool)
            .await?;

        Ok(notifications)
    }

    /// Mark one notification read; only matches the recipient's own rows
    pub async fn mark_read(&self, id: i32, user_id: i32) -> AppResult<Option<Notification>> {
        let updated = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE, updated_at = NOW()
            WHERE notification_id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn mark_all_read(&self, user_id: i32) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = NOW() WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
