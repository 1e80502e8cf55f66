//! API handlers for Bookswap REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod openapi;
pub mod ratings;
pub mod transactions;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts},
    http::{request::Parts, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Authentication("Authentication required".to_string()))?;

        let claims = state.services.users.verify_token(bearer.token())?;
        Ok(AuthenticatedUser(claims))
    }
}

/// JSON body extractor whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path extractor whose rejections use the API error format
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query extractor whose rejections use the API error format
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Plain confirmation body
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct RouteNotFound {
    error: &'static str,
    path: String,
    method: String,
}

async fn route_not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFound {
            error: "Route not found",
            path: uri.path().to_string(),
            method: method.to_string(),
        }),
    )
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    health::mark_started();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.server.body_limit_bytes;

    let api = Router::new()
        // Authentication & profile
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route(
            "/auth/profile",
            get(auth::get_profile)
                .put(auth::update_profile)
                .delete(auth::delete_account),
        )
        .route("/auth/change-password", put(auth::change_password))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/user/my-books", get(books::my_books))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Transactions
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/transactions/:id",
            get(transactions::get_transaction).delete(transactions::cancel_transaction),
        )
        .route("/transactions/:id/accept", put(transactions::accept_transaction))
        .route("/transactions/:id/reject", put(transactions::reject_transaction))
        // Messages
        .route("/messages", post(messages::send_message))
        .route("/messages/conversation/:user_id", get(messages::get_conversation))
        .route("/messages/:id", axum::routing::delete(messages::delete_message))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/:id/read", put(notifications::mark_read))
        // Ratings
        .route("/ratings", post(ratings::create_rating))
        .route("/ratings/users/:id", get(ratings::list_user_ratings))
        .route("/ratings/users/:id/summary", get(ratings::user_rating_summary));

    let app = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api", api)
        .fallback(route_not_found)
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    app.merge(openapi)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
