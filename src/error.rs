//! Error types for Bookswap server

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Whether 5xx responses may carry the underlying error text. Set once at startup.
static EXPOSE_INTERNAL_ERRORS: OnceCell<bool> = OnceCell::new();

/// Enable detailed 5xx bodies (development mode only)
pub fn expose_internal_errors(enabled: bool) {
    let _ = EXPOSE_INTERNAL_ERRORS.set(enabled);
}

fn internal_errors_exposed() -> bool {
    EXPOSE_INTERNAL_ERRORS.get().copied().unwrap_or(false)
}

/// Stable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum ErrorCode {
    Failure,
    DbFailure,
    BadValue,
    InvalidRequest,
    NotAuthenticated,
    NotAuthorized,
    NotFound,
    Duplicate,
    PayloadTooLarge,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Field-level validation failures, one message per violated rule
    #[error("Invalid input: {}", .0.join(", "))]
    InvalidInput(Vec<String>),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl AppError {
    /// HTTP status and error code for this error
    pub fn status(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::Validation(_) | AppError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::PayloadTooLarge),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();

        let (message, details) = match self {
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg) => (msg, None),
            AppError::InvalidInput(details) => ("Invalid data".to_string(), Some(details)),
            AppError::PayloadTooLarge => ("Payload too large".to_string(), None),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                let message = if internal_errors_exposed() {
                    e.to_string()
                } else {
                    "Internal server error".to_string()
                };
                (message, None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                let message = if internal_errors_exposed() {
                    msg
                } else {
                    "Internal server error".to_string()
                };
                (message, None)
            }
        };

        let body = Json(ErrorResponse {
            code,
            error: message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                let message = match db_err.constraint() {
                    Some("users_email_key") | Some("users_username_key") => {
                        "Email or username already registered"
                    }
                    Some("transactions_one_pending_per_requester") => {
                        "You already have a pending request for this book"
                    }
                    Some("ratings_transaction_rater_key") => "You have already rated this transaction",
                    _ => "Resource already exists",
                };
                return AppError::Conflict(message.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return match db_err.constraint() {
                    // The acting user's own row is gone: the token outlived the account
                    Some("books_owner_id_fkey")
                    | Some("transactions_requester_id_fkey")
                    | Some("messages_sender_id_fkey")
                    | Some("ratings_rater_id_fkey") => {
                        AppError::Authentication("Account no longer exists".to_string())
                    }
                    Some("transactions_book_id_fkey") | Some("transactions_offered_book_id_fkey") => {
                        AppError::NotFound("Book not found".to_string())
                    }
                    Some("messages_receiver_id_fkey") => {
                        AppError::NotFound("Receiver not found".to_string())
                    }
                    _ => AppError::NotFound("Referenced resource not found".to_string()),
                };
            }
        }
        AppError::Database(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();
        details.sort();
        AppError::InvalidInput(details)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        match rejection {
            JsonRejection::JsonDataError(e) => AppError::InvalidInput(vec![e.body_text()]),
            JsonRejection::JsonSyntaxError(_) => AppError::BadRequest("Invalid JSON".to_string()),
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest("Expected a JSON request body".to_string())
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::Validation("Invalid id".to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 3, message = "Too short"))]
        name: String,
        #[validate(range(min = 1, max = 5, message = "Out of range"))]
        score: i32,
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Authentication("x".into()).status().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Authorization("x".into()).status().0, StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status().0, StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status().0, StatusCode::CONFLICT);
        assert_eq!(AppError::BadRequest("x".into()).status().0, StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidInput(vec![]).status().0, StatusCode::BAD_REQUEST);
        assert_eq!(AppError::PayloadTooLarge.status().0, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            AppError::Internal("boom".into()).status().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_errors_become_details() {
        let signup = Signup { name: "ab".into(), score: 9 };
        let err: AppError = signup.validate().unwrap_err().into();
        match err {
            AppError::InvalidInput(details) => {
                assert_eq!(details, vec!["Out of range".to_string(), "Too short".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[derive(Debug, Error)]
    #[error("violates constraint {constraint}")]
    struct ConstraintViolation {
        foreign_key: bool,
        constraint: &'static str,
    }

    impl sqlx::error::DatabaseError for ConstraintViolation {
        fn message(&self) -> &str {
            self.constraint
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.constraint)
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.foreign_key {
                sqlx::error::ErrorKind::ForeignKeyViolation
            } else {
                sqlx::error::ErrorKind::UniqueViolation
            }
        }
    }

    fn unique_violation(constraint: &'static str) -> AppError {
        sqlx::Error::Database(Box::new(ConstraintViolation { foreign_key: false, constraint })).into()
    }

    fn foreign_key_violation(constraint: &'static str) -> AppError {
        sqlx::Error::Database(Box::new(ConstraintViolation { foreign_key: true, constraint })).into()
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let err = unique_violation("users_email_key");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_writes_by_deleted_account_are_unauthenticated() {
        for constraint in [
            "books_owner_id_fkey",
            "transactions_requester_id_fkey",
            "messages_sender_id_fkey",
            "ratings_rater_id_fkey",
        ] {
            let err = foreign_key_violation(constraint);
            assert_eq!(err.status().0, StatusCode::UNAUTHORIZED, "{}", constraint);
        }
    }

    #[test]
    fn test_vanished_reference_is_not_found() {
        let err = foreign_key_violation("transactions_book_id_fkey");
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Book not found"),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = foreign_key_violation("ratings_transaction_id_fkey");
        assert_eq!(err.status().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_response_hides_message() {
        let response = AppError::Internal("secret".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
