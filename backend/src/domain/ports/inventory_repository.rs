//! Port for the per-book inventory ledger.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{InventoryRecord, UserId};

/// Errors raised by inventory repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryRepositoryError {
    /// Repository connection could not be established.
    #[error("inventory repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("inventory repository query failed: {message}")]
    Query { message: String },

    /// An inventory record already exists for the book.
    #[error("inventory record already exists for book {book_id}")]
    DuplicateRecord { book_id: Uuid },

    /// No inventory record exists for the book.
    #[error("no inventory record for book {book_id}")]
    NotFound { book_id: Uuid },

    /// The adjustment would drop availability below zero.
    #[error("no copies available for book {book_id}")]
    InsufficientStock { book_id: Uuid },

    /// The adjustment would push availability above the total.
    #[error("availability would exceed total copies for book {book_id}")]
    CapacityExceeded { book_id: Uuid },
}

impl InventoryRepositoryError {
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

/// Port for reading and mutating per-book copy counts.
///
/// Every mutation is a single conditional statement or a row-locked
/// transaction so the `0 <= available <= total` invariant cannot be violated
/// by concurrent callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Create the ledger record for a book with `available = total`.
    async fn initialize(&self, book_id: Uuid, total: i32)
    -> Result<(), InventoryRepositoryError>;

    /// Atomically shift availability by `delta`, rejecting moves outside
    /// `[0, total]`.
    async fn adjust(
        &self,
        book_id: Uuid,
        delta: i32,
    ) -> Result<InventoryRecord, InventoryRepositoryError>;

    /// Administrative override of both counts, recording an audit entry in
    /// the same transaction.
    async fn set_levels(
        &self,
        book_id: Uuid,
        total: i32,
        available: i32,
        admin_id: &UserId,
    ) -> Result<InventoryRecord, InventoryRepositoryError>;

    /// Read the current counts for a book.
    async fn get(&self, book_id: Uuid)
    -> Result<Option<InventoryRecord>, InventoryRepositoryError>;
}

/// Fixture implementation for tests that do not exercise inventory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInventoryRepository;

#[async_trait]
impl InventoryRepository for FixtureInventoryRepository {
    async fn initialize(
        &self,
        _book_id: Uuid,
        _total: i32,
    ) -> Result<(), InventoryRepositoryError> {
        Ok(())
    }

    async fn adjust(
        &self,
        book_id: Uuid,
        _delta: i32,
    ) -> Result<InventoryRecord, InventoryRepositoryError> {
        InventoryRecord::new(book_id, 0, 0)
            .map_err(|err| InventoryRepositoryError::query(err.to_string()))
    }

    async fn set_levels(
        &self,
        book_id: Uuid,
        total: i32,
        available: i32,
        _admin_id: &UserId,
    ) -> Result<InventoryRecord, InventoryRepositoryError> {
        InventoryRecord::new(book_id, total, available)
            .map_err(|err| InventoryRepositoryError::query(err.to_string()))
    }

    async fn get(
        &self,
        _book_id: Uuid,
    ) -> Result<Option<InventoryRecord>, InventoryRepositoryError> {
        Ok(None)
    }
}
