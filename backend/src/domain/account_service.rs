//! Account domain service.
//!
//! Handles registration, credential checks, and account lookups over the user
//! repository and password hasher ports. Email uniqueness comes from the
//! repository's unique index and surfaces here as a conflict; login failures
//! report a single uniform error regardless of which credential was wrong.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::domain::ports::{
    Accounts, LoginRequest, PasswordHasher, PasswordHasherError, RegisterRequest, UserRepository,
    UserRepositoryError,
};
use crate::domain::{Error, User, UserDraft, UserId};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail => {
            Error::conflict("email address already registered")
                .with_details(json!({ "code": "duplicate_email" }))
        }
    }
}

fn map_password_hasher_error(error: PasswordHasherError) -> Error {
    let PasswordHasherError::Hashing { message } = error;
    Error::internal(format!("password hashing failed: {message}"))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid email or password")
}

/// Account service implementing the [`Accounts`] driving port.
#[derive(Clone)]
pub struct AccountService<U, H> {
    user_repo: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> AccountService<U, H> {
    /// Create a new service over the user repository and password hasher.
    pub fn new(user_repo: Arc<U>, hasher: Arc<H>) -> Self {
        Self { user_repo, hasher }
    }
}

impl<U, H> AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn require_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

#[async_trait]
impl<U, H> Accounts for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, request: RegisterRequest) -> Result<User, Error> {
        if request.password.chars().count() < PASSWORD_MIN {
            return Err(Error::invalid_request(format!(
                "password must be at least {PASSWORD_MIN} characters"
            ))
            .with_details(json!({ "field": "password", "code": "password_too_short" })));
        }

        let user = User::new(UserDraft {
            id: UserId::random(),
            display_name: request.display_name,
            email: request.email,
            is_admin: false,
            birth_date: request.birth_date,
            created_at: Utc::now(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(map_password_hasher_error)?;

        self.user_repo
            .insert(&user, &password_hash)
            .await
            .map_err(map_user_repository_error)?;

        Ok(user)
    }

    async fn login(&self, request: LoginRequest) -> Result<User, Error> {
        let email = request.email.trim().to_lowercase();
        let stored = self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(invalid_credentials)?;

        let matches = self
            .hasher
            .verify(&request.password, &stored.password_hash)
            .map_err(map_password_hasher_error)?;
        if !matches {
            return Err(invalid_credentials());
        }

        Ok(stored.user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, Error> {
        self.require_user(&user_id).await
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, Error> {
        Ok(self.require_user(&user_id).await?.is_admin())
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.user_repo.list().await.map_err(map_user_repository_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
