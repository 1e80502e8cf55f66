//! Ratings service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        notification::{NewNotification, NotificationKind},
        rating::{CreateRatingRequest, Rating, RatingSummary, RatingWithRater},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RatingsService {
    repository: Repository,
}

impl RatingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Rate the other participant of a completed transaction
    pub async fn add(&self, rater_id: i32, request: CreateRatingRequest) -> AppResult<Rating> {
        let request = CreateRatingRequest {
            comment: request
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            ..request
        };
        request.validate()?;

        if request.rated_id == rater_id {
            return Err(AppError::BadRequest("You cannot rate yourself".to_string()));
        }

        let eligibility = self
            .repository
            .ratings
            .eligibility(request.transaction_id, rater_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;
        eligibility.check(rater_id, request.rated_id)?;

        // Concurrent duplicates hit the (transaction, rater) unique key → 409
        let rating = self.repository.ratings.create(rater_id, &request).await?;
        tracing::info!(
            rating_id = rating.rating_id,
            transaction_id = rating.transaction_id,
            "Rating added"
        );

        let notification = NewNotification::new(
            rating.rated_id,
            NotificationKind::NewRating,
            "New rating",
            format!("You received a {}-star rating", rating.rating),
            Some(rating.rating_id),
        );
        if let Err(e) = self.repository.notifications.create(&notification).await {
            tracing::warn!(user_id = rating.rated_id, "Failed to create notification: {}", e);
        }

        Ok(rating)
    }

    /// Ratings a user received, newest first
    pub async fn ratings_for(&self, user_id: i32) -> AppResult<Vec<RatingWithRater>> {
        self.ensure_user(user_id).await?;
        self.repository.ratings.list_for_user(user_id).await
    }

    pub async fn summary_for(&self, user_id: i32) -> AppResult<RatingSummary> {
        self.ensure_user(user_id).await?;
        self.repository.ratings.summary(user_id).await
    }

    async fn ensure_user(&self, user_id: i32) -> AppResult<()> {
        if !self.repository.users.exists(user_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::lazy_repository;

    #[tokio::test]
    async fn test_out_of_range_rating_rejected() {
        let service = RatingsService::new(lazy_repository());
        let err = service
            .add(
                1,
                CreateRatingRequest {
                    transaction_id: 10,
                    rated_id: 2,
                    rating: 6,
                    comment: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_self_rating_rejected() {
        let service = RatingsService::new(lazy_repository());
        let err = service
            .add(
                1,
                CreateRatingRequest {
                    transaction_id: 10,
                    rated_id: 1,
                    rating: 5,
                    comment: Some("ótimo".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
