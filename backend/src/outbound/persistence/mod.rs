//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types; business rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Invariants in SQL**: consistency-critical mutations run as single
//!   conditional statements or transactions, so the database (not a
//!   read-then-write sequence) enforces stock bounds and uniqueness.
//! - **Strongly typed errors**: database failures map onto the repository
//!   error enums defined by the ports.

mod diesel_catalog_repository;
mod diesel_comment_repository;
mod diesel_error_mapping;
mod diesel_inventory_repository;
mod diesel_loan_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_catalog_repository::DieselCatalogRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_inventory_repository::DieselInventoryRepository;
pub use diesel_loan_repository::DieselLoanRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
