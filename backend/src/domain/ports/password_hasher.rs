//! Port for password hashing and verification.

/// Errors raised by password hasher adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHasherError {
    /// Hashing or verification failed inside the adapter.
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
}

impl PasswordHasherError {
    /// Create a hashing error with the given message.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }
}

/// Port for deriving and checking password hashes.
///
/// Synchronous by design: hashing is CPU-bound, and callers decide whether to
/// move it off the async runtime.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Derive a storable hash from a plaintext password.
    fn hash(&self, password: &str) -> Result<String, PasswordHasherError>;

    /// Check a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHasherError>;
}

/// Fixture implementation storing passwords verbatim. Tests only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

impl PasswordHasher for FixturePasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHasherError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHasherError> {
        Ok(hash == format!("plain:{password}"))
    }
}
