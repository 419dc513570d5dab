//! Driving port for user accounts and authentication.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Error, User, UserId};

/// Request to register a new account.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub birth_date: NaiveDate,
}

/// Request to authenticate an existing account.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Driving port for account management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Register a new user; duplicate emails conflict.
    async fn register(&self, request: RegisterRequest) -> Result<User, Error>;

    /// Verify credentials and return the account.
    async fn login(&self, request: LoginRequest) -> Result<User, Error>;

    /// Look up an account by id.
    async fn get_user(&self, user_id: UserId) -> Result<User, Error>;

    /// Whether the account holds administrative rights.
    async fn is_admin(&self, user_id: UserId) -> Result<bool, Error>;

    /// All accounts. Admin view.
    async fn list_users(&self) -> Result<Vec<User>, Error>;
}
