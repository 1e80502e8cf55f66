//! Book catalog endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::book::{Book, BookPayload, BookQuery, BookWithOwner},
};

use super::{AppJson, AppPath, AppQuery, AuthenticatedUser};

/// List books with optional filters
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books, newest first", body = Vec<BookWithOwner>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AppQuery(query): AppQuery<BookQuery>,
) -> AppResult<Json<Vec<BookWithOwner>>> {
    let books = state.services.catalog.search_books(&query).await?;
    Ok(Json(books))
}

/// Get book details
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookWithOwner),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<BookWithOwner>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Books listed by the current user
#[utoipa::path(
    get,
    path = "/api/books/user/my-books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own books", body = Vec<Book>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.my_books(claims.user_id).await?;
    Ok(Json(books))
}

/// List a new book
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid data", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(payload): AppJson<BookPayload>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state
        .services
        .catalog
        .create_book(claims.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update one of your books
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid data", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<BookPayload>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .catalog
        .update_book(id, claims.user_id, payload)
        .await?;
    Ok(Json(book))
}

/// Delete one of your books
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id, claims.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
