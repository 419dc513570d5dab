//! Port for user account persistence.

use async_trait::async_trait;

use crate::domain::{User, UserId};

/// Errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },

    /// Another account already uses this email address.
    #[error("email address already registered")]
    DuplicateEmail,
}

impl UserRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Stored credentials for a user: the entity plus its password hash.
///
/// The hash never enters the [`User`] entity; it only travels from the
/// repository to the verifier during login.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// Port for writing and reading user accounts.
///
/// Duplicate registrations surface as
/// [`UserRepositoryError::DuplicateEmail`] from the unique email index
/// rather than from a point-in-time lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user with their password hash.
    async fn insert(&self, user: &User, password_hash: &str)
    -> Result<(), UserRepositoryError>;

    /// Find a user and their hash by normalised email.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<StoredUser>, UserRepositoryError>;

    /// Find a user by id.
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;
}

/// Fixture implementation for tests that do not exercise accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn insert(
        &self,
        _user: &User,
        _password_hash: &str,
    ) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn find_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<StoredUser>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_id(&self, _user_id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        Ok(Vec::new())
    }
}
