//! Authentication and profile endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::user::{
        AuthResponse, ChangePassword, DeleteAccount, LoginRequest, RegisterRequest, UpdateProfile,
        User, UserShort,
    },
};

use super::{AppJson, AuthenticatedUser, MessageResponse};

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid data", body = crate::error::ErrorResponse),
        (status = 409, description = "Email or username already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let (user, token) = state.services.users.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserShort::from(&user),
            token,
        }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, token) = state.services.users.authenticate(request).await?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserShort::from(&user),
        token,
    }))
}

/// Get current user profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_profile(claims.user_id).await?;
    Ok(Json(user))
}

/// Update current user profile
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid data", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(profile): AppJson<UpdateProfile>,
) -> AppResult<Json<User>> {
    let user = state
        .services
        .users
        .update_profile(claims.user_id, profile)
        .await?;
    Ok(Json(user))
}

/// Change password
#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Same or weak new password", body = crate::error::ErrorResponse),
        (status = 401, description = "Current password is incorrect", body = crate::error::ErrorResponse)
    )
)]
pub async fn change_password(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(request): AppJson<ChangePassword>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .users
        .change_password(claims.user_id, request)
        .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// Delete own account
#[utoipa::path(
    delete,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = DeleteAccount,
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Password is incorrect", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_account(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(request): AppJson<DeleteAccount>,
) -> AppResult<StatusCode> {
    state
        .services
        .users
        .delete_account(claims.user_id, request)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
