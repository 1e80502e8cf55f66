//! Messages repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::message::{Message, MessageSide},
};

#[derive(Clone)]
pub struct MessagesRepository {
    pool: Pool<Postgres>,
}

impl MessagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store a new message
    pub async fn create(&self, sender_id: i32, receiver_id: i32, content: &str) -> AppResult<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, receiver_id, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Get message by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Message>> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE message_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    /// Thread between `user_id` and `other_id`, oldest first, without the
    /// messages `user_id` has deleted on their side
    pub async fn conversation(&self, user_id: i32, other_id: i32) -> AppResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2 AND NOT deleted_by_sender)
               OR (sender_id = $2 AND receiver_id = $1 AND NOT deleted_by_receiver)
            ORDER BY created_at ASC, message_id ASC
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Soft-delete one side of a message
    pub async fn flag_deleted(&self, id: i32, side: MessageSide) -> AppResult<Option<Message>> {
        let query = match side {
            MessageSide::Sender => {
                "UPDATE messages SET deleted_by_sender = TRUE WHERE message_id = $1 RETURNING *"
            }
            MessageSide::Receiver => {
                "UPDATE messages SET deleted_by_receiver = TRUE WHERE message_id = $1 RETURNING *"
            }
        };

        let message = sqlx::query_as::<_, Message>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    /// Remove a message once both participants deleted it
    pub async fn purge_if_deleted_by_both(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM messages WHERE message_id = $1 AND deleted_by_sender AND deleted_by_receiver",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
