//! Direct messaging service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        message::{Message, SendMessageRequest},
        notification::{NewNotification, NotificationKind},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct MessagesService {
    repository: Repository,
}

impl MessagesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn send(&self, sender_id: i32, request: SendMessageRequest) -> AppResult<Message> {
        let request = SendMessageRequest {
            content: request.content.trim().to_string(),
            ..request
        };
        if request.content.is_empty() {
            return Err(AppError::Validation("Message content cannot be empty".to_string()));
        }
        request.validate()?;

        if request.receiver_id == sender_id {
            return Err(AppError::BadRequest(
                "You cannot send a message to yourself".to_string(),
            ));
        }

        if !self.repository.users.exists(request.receiver_id).await? {
            return Err(AppError::NotFound("Receiver not found".to_string()));
        }

        let message = self
            .repository
            .messages
            .create(sender_id, request.receiver_id, &request.content)
            .await?;

        let notification = NewNotification::new(
            request.receiver_id,
            NotificationKind::NewMessage,
            "New message",
            "You received a new message",
            Some(message.message_id),
        );
        if let Err(e) = self.repository.notifications.create(&notification).await {
            tracing::warn!(user_id = request.receiver_id, "Failed to create notification: {}", e);
        }

        Ok(message)
    }

    /// Thread with another user, oldest first
    pub async fn conversation(&self, user_id: i32, other_id: i32) -> AppResult<Vec<Message>> {
        self.repository.messages.conversation(user_id, other_id).await
    }

    /// Hide a message on the caller's side; the row goes away once
    /// both participants have deleted it
    pub async fn delete(&self, user_id: i32, message_id: i32) -> AppResult<()> {
        let message = self
            .repository
            .messages
            .get_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

        let side = message.side_of(user_id).ok_or_else(|| {
            AppError::Authorization("You can only delete your own messages".to_string())
        })?;

        let flagged = self
            .repository
            .messages
            .flag_deleted(message_id, side)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

        if flagged.deleted_by_sender && flagged.deleted_by_receiver {
            self.repository.messages.purge_if_deleted_by_both(message_id).await?;
            tracing::debug!(message_id, "Message purged");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::lazy_repository;

    fn request(receiver_id: i32, content: &str) -> SendMessageRequest {
        SendMessageRequest {
            receiver_id,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let service = MessagesService::new(lazy_repository());
        let err = service.send(1, request(2, "   \n")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_long_message_rejected() {
        let service = MessagesService::new(lazy_repository());
        let err = service.send(1, request(2, &"a".repeat(2001))).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_length_limit_applies_to_trimmed_content() {
        let service = MessagesService::new(lazy_repository());
        let padded = format!("  {}\n\n", "a".repeat(2000));
        // Passes validation and reaches the self-message check
        let err = service.send(1, request(1, &padded)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_self_message_rejected() {
        let service = MessagesService::new(lazy_repository());
        let err = service.send(1, request(1, "oi")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
