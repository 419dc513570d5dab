//! Outbound adapters implementing the domain's driven ports.

mod bcrypt_hasher;
pub mod persistence;

pub use bcrypt_hasher::BcryptPasswordHasher;
