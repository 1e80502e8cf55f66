//! Ratings repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::rating::{CreateRatingRequest, Rating, RatingEligibility, RatingSummary, RatingWithRater},
};

#[derive(Clone)]
pub struct RatingsRepository {
    pool: Pool<Postgres>,
}

impl RatingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Transaction state relevant to `rater_id` rating it
    pub async fn eligibility(&self, transaction_id: i32, rater_id: i32) -> AppResult<Option<RatingEligibility>> {
        let eligibility = sqlx::query_as::<_, RatingEligibility>(
            r#"
            SELECT
                t.transaction_id,
                t.status,
                t.requester_id,
                t.owner_id,
                EXISTS(
                    SELECT 1 FROM ratings r
                    WHERE r.transaction_id = t.transaction_id AND r.rater_id = $2
                ) AS already_rated
            FROM transactions t
            WHERE t.transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .bind(rater_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(eligibility)
    }

    pub async fn create(&self, rater_id: i32, rating: &CreateRatingRequest) -> AppResult<Rating> {
        let created = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (transaction_id, rater_id, rated_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(rating.transaction_id)
        .bind(rater_id)
        .bind(rating.rated_id)
        .bind(rating.rating)
        .bind(&rating.comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Ratings received by a user, newest first
    pub async fn list_for_user(&self, rated_id: i32) -> AppResult<Vec<RatingWithRater>> {
        let ratings = sqlx::query_as::<_, RatingWithRater>(
            r#"
            SELECT r.*, u.username AS rater_username
            FROM ratings r
            JOIN users u ON r.rater_id = u.user_id
            WHERE r.rated_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(rated_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    pub async fn summary(&self, rated_id: i32) -> AppResult<RatingSummary> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT $1::INTEGER AS user_id,
                   AVG(rating)::FLOAT8 AS average,
                   COUNT(*) AS count
            FROM ratings
            WHERE rated_id = $1
            "#,
        )
        .bind(rated_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}
