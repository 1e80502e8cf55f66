//! Notifications service

use crate::{
    error::{AppError, AppResult},
    models::notification::{MarkedRead, Notification},
    repository::Repository,
};

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
}

impl NotificationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, user_id: i32, is_read: Option<bool>) -> AppResult<Vec<Notification>> {
        self.repository.notifications.list_for_user(user_id, is_read).await
    }

    pub async fn mark_read(&self, user_id: i32, notification_id: i32) -> AppResult<Notification> {
        self.repository
            .notifications
            .mark_read(notification_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }

    pub async fn mark_all_read(&self, user_id: i32) -> AppResult<MarkedRead> {
        let updated = self.repository.notifications.mark_all_read(user_id).await?;
        Ok(MarkedRead { updated })
    }
}
