//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, messages, notifications, ratings, transactions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookswap API",
        version = "1.0.0",
        description = "Peer-to-peer book exchange and loan marketplace REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::root,
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::get_profile,
        auth::update_profile,
        auth::change_password,
        auth::delete_account,
        // Books
        books::list_books,
        books::get_book,
        books::my_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Transactions
        transactions::list_transactions,
        transactions::create_transaction,
        transactions::get_transaction,
        transactions::accept_transaction,
        transactions::reject_transaction,
        transactions::cancel_transaction,
        // Messages
        messages::send_message,
        messages::get_conversation,
        messages::delete_message,
        // Notifications
        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_all_read,
        // Ratings
        ratings::create_rating,
        ratings::list_user_ratings,
        ratings::user_rating_summary,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::AuthResponse,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::UpdateProfile,
            crate::models::user::ChangePassword,
            crate::models::user::DeleteAccount,
            // Books
            crate::models::book::Book,
            crate::models::book::BookWithOwner,
            crate::models::book::BookCondition,
            crate::models::book::BookPayload,
            // Transactions
            crate::models::transaction::Transaction,
            crate::models::transaction::TransactionDetails,
            crate::models::transaction::TransactionType,
            crate::models::transaction::TransactionStatus,
            crate::models::transaction::CreateTransactionRequest,
            // Messages
            crate::models::message::Message,
            crate::models::message::SendMessageRequest,
            // Notifications
            crate::models::notification::Notification,
            crate::models::notification::MarkedRead,
            // Ratings
            crate::models::rating::Rating,
            crate::models::rating::RatingWithRater,
            crate::models::rating::RatingSummary,
            crate::models::rating::CreateRatingRequest,
            // Health
            health::HealthResponse,
            health::RootResponse,
            // Common
            crate::api::MessageResponse,
            crate::error::ErrorResponse,
            crate::error::ErrorCode,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and profile"),
        (name = "books", description = "Book catalog"),
        (name = "transactions", description = "Exchange and loan requests"),
        (name = "messages", description = "Direct messages"),
        (name = "notifications", description = "User notifications"),
        (name = "ratings", description = "User ratings")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` JWT scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/transactions",
            "/api/transactions/{id}/accept",
            "/api/books/{id}",
            "/api/auth/change-password",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
