//! Bcrypt-backed implementation of the password hasher port.

use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Password hasher deriving bcrypt hashes at the default cost.
#[derive(Debug, Default, Clone, Copy)]
pub struct BcryptPasswordHasher;

impl BcryptPasswordHasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHasherError> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHasherError> {
        bcrypt::verify(password, hash)
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn hash_and_verify_round_trip() {
        let hasher = BcryptPasswordHasher::new();
        let hash = hasher.hash("correct horse").expect("hash succeeds");
        assert_ne!(hash, "correct horse");
        assert!(hasher.verify("correct horse", &hash).expect("verify succeeds"));
        assert!(!hasher.verify("wrong", &hash).expect("verify succeeds"));
    }

    #[rstest]
    fn malformed_hashes_surface_as_errors() {
        let hasher = BcryptPasswordHasher::new();
        let err = hasher
            .verify("anything", "not-a-bcrypt-hash")
            .expect_err("malformed hash should fail");
        assert!(matches!(err, PasswordHasherError::Hashing { .. }));
    }
}
