//! Direct messaging endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::message::{Message, SendMessageRequest},
};

use super::{AppJson, AppPath, AuthenticatedUser};

/// Send a message to another user
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    security(("bearer_auth" = [])),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Empty, too long or self-addressed", body = crate::error::ErrorResponse),
        (status = 404, description = "Receiver not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_message(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(request): AppJson<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let message = state.services.messages.send(claims.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Conversation with another user, oldest first
#[utoipa::path(
    get,
    path = "/api/messages/conversation/{user_id}",
    tag = "messages",
    security(("bearer_auth" = [])),
    params(("user_id" = i32, Path, description = "Other participant")),
    responses(
        (status = 200, description = "Messages visible to the caller", body = Vec<Message>)
    )
)]
pub async fn get_conversation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(other_id): AppPath<i32>,
) -> AppResult<Json<Vec<Message>>> {
    let messages = state
        .services
        .messages
        .conversation(claims.user_id, other_id)
        .await?;
    Ok(Json(messages))
}

/// Delete a message on the caller's side
#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    tag = "messages",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Message ID")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 403, description = "Not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Message not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_message(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.services.messages.delete(claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
