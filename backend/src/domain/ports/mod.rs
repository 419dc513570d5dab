//! Domain ports and supporting types for the hexagonal boundary.

mod accounts;
mod catalog;
mod catalog_repository;
mod comment_repository;
mod comments;
mod inventory_repository;
mod loan_repository;
mod loans;
mod password_hasher;
mod user_repository;

#[cfg(test)]
pub use accounts::MockAccounts;
pub use accounts::{Accounts, LoginRequest, RegisterRequest};
#[cfg(test)]
pub use catalog::{MockCatalogCommand, MockCatalogQuery};
pub use catalog::{BookUpdate, CatalogBook, CatalogCommand, CatalogQuery, NewBook, SearchResults};
#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
pub use catalog_repository::{
    CatalogFilter, CatalogRepository, CatalogRepositoryError, CategoryCount,
    FixtureCatalogRepository,
};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError, FixtureCommentRepository};
#[cfg(test)]
pub use comments::{MockCommentCommand, MockCommentQuery};
pub use comments::{AddCommentRequest, CommentCommand, CommentQuery};
#[cfg(test)]
pub use inventory_repository::MockInventoryRepository;
pub use inventory_repository::{
    FixtureInventoryRepository, InventoryRepository, InventoryRepositoryError,
};
#[cfg(test)]
pub use loan_repository::MockLoanRepository;
pub use loan_repository::{FixtureLoanRepository, LoanRepository, LoanRepositoryError};
#[cfg(test)]
pub use loans::{MockLoanCommand, MockLoanQuery};
pub use loans::{BorrowRequest, LoanCommand, LoanQuery, ReturnRequest};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{FixturePasswordHasher, PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    FixtureUserRepository, StoredUser, UserRepository, UserRepositoryError,
};
