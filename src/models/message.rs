//! Direct message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Message model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Message {
    pub message_id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub content: String,
    pub deleted_by_sender: bool,
    pub deleted_by_receiver: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Which side of the conversation `user_id` is on, if any
    pub fn side_of(&self, user_id: i32) -> Option<MessageSide> {
        if self.sender_id == user_id {
            Some(MessageSide::Sender)
        } else if self.receiver_id == user_id {
            Some(MessageSide::Receiver)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSide {
    Sender,
    Receiver,
}

/// Send message request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[validate(range(min = 1, message = "receiver_id must be a positive integer"))]
    pub receiver_id: i32,
    #[validate(length(max = 2000, message = "Message is too long (max 2000 characters)"))]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message {
            message_id: 1,
            sender_id: 1,
            receiver_id: 2,
            content: "Olá".into(),
            deleted_by_sender: false,
            deleted_by_receiver: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_side_of() {
        let m = message();
        assert_eq!(m.side_of(1), Some(MessageSide::Sender));
        assert_eq!(m.side_of(2), Some(MessageSide::Receiver));
        assert_eq!(m.side_of(3), None);
    }
}
