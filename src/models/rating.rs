//! Rating model and eligibility rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::transaction::TransactionStatus;
use crate::error::AppError;

/// Rating model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rating {
    pub rating_id: i32,
    pub transaction_id: i32,
    pub rater_id: i32,
    pub rated_id: i32,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Rating with the rater's username, as listed on a profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RatingWithRater {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub rating: Rating,
    pub rater_username: String,
}

/// Aggregate of the ratings a user received
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RatingSummary {
    pub user_id: i32,
    pub average: Option<f64>,
    pub count: i64,
}

/// Add rating request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRatingRequest {
    #[validate(range(min = 1, message = "transaction_id must be a positive integer"))]
    pub transaction_id: i32,
    #[validate(range(min = 1, message = "rated_id must be a positive integer"))]
    pub rated_id: i32,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 500, message = "Comment is too long (max 500 characters)"))]
    pub comment: Option<String>,
}

/// State of a transaction as seen by a prospective rater
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct RatingEligibility {
    pub transaction_id: i32,
    pub status: TransactionStatus,
    pub requester_id: i32,
    pub owner_id: i32,
    pub already_rated: bool,
}

impl RatingEligibility {
    /// Check that `rater_id` may rate `rated_id` for this transaction
    pub fn check(&self, rater_id: i32, rated_id: i32) -> Result<(), AppError> {
        if self.status != TransactionStatus::Concluido {
            return Err(AppError::BadRequest(
                "The transaction must be completed before it can be rated".to_string(),
            ));
        }
        if self.already_rated {
            return Err(AppError::Conflict(
                "You have already rated this transaction".to_string(),
            ));
        }
        let participant = |id: i32| id == self.requester_id || id == self.owner_id;
        if !participant(rater_id) || !participant(rated_id) {
            return Err(AppError::Authorization(
                "User did not take part in this transaction".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eligibility(status: TransactionStatus, already_rated: bool) -> RatingEligibility {
        RatingEligibility {
            transaction_id: 1,
            status,
            requester_id: 1,
            owner_id: 2,
            already_rated,
        }
    }

    #[test]
    fn test_participants_can_rate_completed() {
        assert!(eligibility(TransactionStatus::Concluido, false).check(1, 2).is_ok());
        assert!(eligibility(TransactionStatus::Concluido, false).check(2, 1).is_ok());
    }

    #[test]
    fn test_requires_completed() {
        for status in [
            TransactionStatus::Pendente,
            TransactionStatus::Aceito,
            TransactionStatus::Recusado,
        ] {
            assert!(matches!(
                eligibility(status, false).check(1, 2),
                Err(AppError::BadRequest(_))
            ));
        }
    }

    #[test]
    fn test_only_once_per_rater() {
        assert!(matches!(
            eligibility(TransactionStatus::Concluido, true).check(1, 2),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_outsiders_rejected() {
        let e = eligibility(TransactionStatus::Concluido, false);
        assert!(matches!(e.check(3, 2), Err(AppError::Authorization(_))));
        assert!(matches!(e.check(1, 3), Err(AppError::Authorization(_))));
    }

    #[test]
    fn test_score_range_validated() {
        let request = CreateRatingRequest {
            transaction_id: 1,
            rated_id: 2,
            rating: 6,
            comment: None,
        };
        assert!(request.validate().is_err());
        let request = CreateRatingRequest { rating: 0, ..request };
        assert!(request.validate().is_err());
        let request = CreateRatingRequest { rating: 5, ..request };
        assert!(request.validate().is_ok());
    }
}
