//! Rating endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::rating::{CreateRatingRequest, Rating, RatingSummary, RatingWithRater},
};

use super::{AppJson, AppPath, AuthenticatedUser};

/// Rate the other participant of a completed transaction
#[utoipa::path(
    post,
    path = "/api/ratings",
    tag = "ratings",
    security(("bearer_auth" = [])),
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating added", body = Rating),
        (status = 400, description = "Invalid rating, self-rating or transaction not completed", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already rated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_rating(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(request): AppJson<CreateRatingRequest>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let rating = state.services.ratings.add(claims.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

/// Ratings a user received
#[utoipa::path(
    get,
    path = "/api/ratings/users/{id}",
    tag = "ratings",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Ratings, newest first", body = Vec<RatingWithRater>),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_user_ratings(
    State(state): State<crate::AppState>,
    AppPath(user_id): AppPath<i32>,
) -> AppResult<Json<Vec<RatingWithRater>>> {
    let ratings = state.services.ratings.ratings_for(user_id).await?;
    Ok(Json(ratings))
}

/// Average score and count for a user
#[utoipa::path(
    get,
    path = "/api/ratings/users/{id}/summary",
    tag = "ratings",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Rating summary", body = RatingSummary),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn user_rating_summary(
    State(state): State<crate::AppState>,
    AppPath(user_id): AppPath<i32>,
) -> AppResult<Json<RatingSummary>> {
    let summary = state.services.ratings.summary_for(user_id).await?;
    Ok(Json(summary))
}
