//! User model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid username pattern"));

/// Minimum accepted password length
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short user representation returned with tokens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserShort {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl From<&User> for UserShort {
    fn from(user: &User) -> Self {
        UserShort {
            user_id: user.user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

/// Register / login response
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserShort,
    pub token: String,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(path = *USERNAME_RE, message = "Username may only contain letters, digits and underscore")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(max = 255, message = "Full name is too long"))]
    pub full_name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Update own profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(max = 255, message = "Full name is too long"))]
    pub full_name: Option<String>,
    #[validate(length(max = 500, message = "Bio is too long"))]
    pub bio: Option<String>,
    #[validate(length(max = 100, message = "City name is too long"))]
    pub city: Option<String>,
    #[validate(length(max = 100, message = "State name is too long"))]
    pub state: Option<String>,
    #[validate(url(message = "Invalid profile picture URL"))]
    pub profile_picture_url: Option<String>,
}

/// Change password request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePassword {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Account deletion request (password re-verification)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteAccount {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password strength policy applied when a password is changed
pub fn check_password_strength(password: &str) -> Result<(), AppError> {
    let mut problems = Vec::new();
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        problems.push(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LENGTH
        ));
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        problems.push("Password must contain at least one letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain at least one digit".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidInput(problems))
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: i32,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Claims for `user` valid for `hours` from now
    pub fn for_user(user_id: i32, username: &str, hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            user_id,
            username: username.to_string(),
            exp: now + (hours as i64 * 3600),
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}
