//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Notification model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub notification_id: i32,
    pub user_id: i32,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub related_id: Option<i32>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Events that produce a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    TransactionRequested,
    TransactionAccepted,
    TransactionRejected,
    TransactionCancelled,
    NewMessage,
    NewRating,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::TransactionRequested => "transaction_request",
            NotificationKind::TransactionAccepted => "transaction_accepted",
            NotificationKind::TransactionRejected => "transaction_rejected",
            NotificationKind::TransactionCancelled => "transaction_cancelled",
            NotificationKind::NewMessage => "new_message",
            NotificationKind::NewRating => "new_rating",
        }
    }
}

/// Notification to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: i32,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_id: Option<i32>,
}

impl NewNotification {
    pub fn new(
        user_id: i32,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        related_id: Option<i32>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            related_id,
        }
    }
}

/// Notification list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    pub is_read: Option<bool>,
}

/// Count of notifications affected by a bulk update
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkedRead {
    pub updated: u64,
}
