//! Exchange / loan transaction endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::transaction::{
        CreateTransactionRequest, Transaction, TransactionDetails, TransactionQuery,
    },
};

use super::{AppJson, AppPath, AppQuery, AuthenticatedUser};

/// List transactions where the current user is requester or owner
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(TransactionQuery),
    responses(
        (status = 200, description = "Transactions, newest first", body = Vec<TransactionDetails>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_transactions(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppQuery(query): AppQuery<TransactionQuery>,
) -> AppResult<Json<Vec<TransactionDetails>>> {
    let transactions = state
        .services
        .transactions
        .list(claims.user_id, query.status_filter())
        .await?;
    Ok(Json(transactions))
}

/// Request an exchange or a loan
#[utoipa::path(
    post,
    path = "/api/transactions",
    tag = "transactions",
    security(("bearer_auth" = [])),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Request created", body = Transaction),
        (status = 400, description = "Invalid data or own book", body = crate::error::ErrorResponse),
        (status = 403, description = "Offered book is not yours", body = crate::error::ErrorResponse),
        (status = 404, description = "Book or offered book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Pending request already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_transaction(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(request): AppJson<CreateTransactionRequest>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let transaction = state
        .services
        .transactions
        .create(claims.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Get transaction details
#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction details", body = TransactionDetails),
        (status = 403, description = "Not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_transaction(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<TransactionDetails>> {
    let details = state.services.transactions.get(id, claims.user_id).await?;
    Ok(Json(details))
}

/// Accept a pending request (book owner only)
#[utoipa::path(
    put,
    path = "/api/transactions/{id}/accept",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Request accepted", body = Transaction),
        (status = 403, description = "Not the owner or not pending", body = crate::error::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn accept_transaction(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Transaction>> {
    let transaction = state.services.transactions.accept(id, claims.user_id).await?;
    Ok(Json(transaction))
}

/// Reject a pending request (book owner only)
#[utoipa::path(
    put,
    path = "/api/transactions/{id}/reject",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Request rejected", body = Transaction),
        (status = 403, description = "Not the owner or not pending", body = crate::error::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn reject_transaction(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Transaction>> {
    let transaction = state.services.transactions.reject(id, claims.user_id).await?;
    Ok(Json(transaction))
}

/// Cancel a pending request (requester only)
#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 204, description = "Request cancelled"),
        (status = 403, description = "Not the requester or not pending", body = crate::error::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel_transaction(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.services.transactions.cancel(id, claims.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
