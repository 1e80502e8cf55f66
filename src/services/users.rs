//! Credential and identity service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{
        check_password_strength, ChangePassword, DeleteAccount, LoginRequest, RegisterRequest,
        UpdateProfile, User, UserClaims,
    },
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account and log it in
    pub async fn register(&self, request: RegisterRequest) -> AppResult<(User, String)> {
        let request = RegisterRequest {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            full_name: request
                .full_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            ..request
        };
        request.validate()?;

        if self
            .repository
            .users
            .email_or_username_exists(&request.email, &request.username)
            .await?
        {
            return Err(AppError::Conflict(
                "Email or username already registered".to_string(),
            ));
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(
                &request.username,
                &request.email,
                &password_hash,
                request.full_name.as_deref(),
            )
            .await?;

        tracing::info!(user_id = user.user_id, "User registered");
        let token = self.create_token_for_user(&user)?;
        Ok((user, token))
    }

    /// Authenticate with email and password.
    /// Unknown email and wrong password fail identically.
    pub async fn authenticate(&self, request: LoginRequest) -> AppResult<(User, String)> {
        let request = LoginRequest {
            email: request.email.trim().to_lowercase(),
            ..request
        };
        // Malformed input gets the same answer as a wrong password
        if request.validate().is_err() {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&user, &request.password)? {
            tracing::debug!(user_id = user.user_id, "Login rejected: wrong password");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((user, token))
    }

    /// Validate a bearer token and return its claims
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))
    }

    pub async fn get_profile(&self, user_id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    /// Update profile fields; absent fields keep their current value
    pub async fn update_profile(&self, user_id: i32, profile: UpdateProfile) -> AppResult<User> {
        profile.validate()?;
        self.repository.users.update_profile(user_id, &profile).await
    }

    /// Change password after re-verifying the current one
    pub async fn change_password(&self, user_id: i32, request: ChangePassword) -> AppResult<()> {
        request.validate()?;

        if request.old_password == request.new_password {
            return Err(AppError::Validation(
                "New password must be different from the current password".to_string(),
            ));
        }
        check_password_strength(&request.new_password)?;

        let user = self.repository.users.get_by_id(user_id).await?;
        if !verify_password(&user, &request.old_password)? {
            return Err(AppError::Authentication(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = self.hash_password(&request.new_password)?;
        self.repository.users.update_password(user_id, &password_hash).await?;

        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    /// Delete own account after re-verifying the password
    pub async fn delete_account(&self, user_id: i32, request: DeleteAccount) -> AppResult<()> {
        request.validate()?;

        let user = self.repository.users.get_by_id(user_id).await?;
        if !verify_password(&user, &request.password)? {
            return Err(AppError::Authentication("Password is incorrect".to_string()));
        }

        self.repository.users.delete(user_id).await?;
        tracing::info!(user_id, "Account deleted");
        Ok(())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        UserClaims::for_user(user.user_id, &user.username, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

/// Verify a plaintext password against the stored PHC hash
fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
