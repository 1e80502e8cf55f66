//! Notification endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::notification::{MarkedRead, Notification, NotificationQuery},
};

use super::{AppPath, AppQuery, AuthenticatedUser};

/// List own notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications", body = Vec<Notification>)
    )
)]
pub async fn list_notifications(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppQuery(query): AppQuery<NotificationQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state
        .services
        .notifications
        .list(claims.user_id, query.is_read)
        .await?;
    Ok(Json(notifications))
}

/// Mark one notification as read
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification updated", body = Notification),
        (status = 404, description = "Notification not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Notification>> {
    let notification = state
        .services
        .notifications
        .mark_read(claims.user_id, id)
        .await?;
    Ok(Json(notification))
}

/// Mark every notification as read
#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Number of notifications updated", body = MarkedRead)
    )
)]
pub async fn mark_all_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<MarkedRead>> {
    let marked = state
        .services
        .notifications
        .mark_all_read(claims.user_id)
        .await?;
    Ok(Json(marked))
}
