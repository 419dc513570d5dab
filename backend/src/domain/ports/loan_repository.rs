//! Port for loan persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Loan, LoanWithBook, LoanWithBorrower, UserId};

/// Errors raised by loan repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoanRepositoryError {
    /// Repository connection could not be established.
    #[error("loan repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("loan repository query failed: {message}")]
    Query { message: String },

    /// The borrower already has an active loan for this book.
    #[error("user already has an active loan for book {book_id}")]
    DuplicateActiveLoan { book_id: Uuid },

    /// No copies are available to lend.
    #[error("no copies available for book {book_id}")]
    BookUnavailable { book_id: Uuid },

    /// The loan does not exist.
    #[error("loan {loan_id} not found")]
    NotFound { loan_id: Uuid },

    /// The loan has already been returned.
    #[error("loan {loan_id} already returned")]
    AlreadyReturned { loan_id: Uuid },
}

impl LoanRepositoryError {
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

/// Port for recording loan transitions and reading loan projections.
///
/// `create_active` and `mark_returned` each run as one transaction covering
/// the loan row, the availability update, and the audit event. Duplicate
/// active loans surface as [`LoanRepositoryError::DuplicateActiveLoan`] from
/// the partial unique index rather than from a point-in-time lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Persist a new active loan, decrementing availability.
    async fn create_active(&self, loan: &Loan) -> Result<(), LoanRepositoryError>;

    /// Mark an active loan returned, incrementing availability (clamped to
    /// the total). Returns the updated loan.
    async fn mark_returned(&self, loan_id: Uuid) -> Result<Loan, LoanRepositoryError>;

    /// Find a loan by id.
    async fn find(&self, loan_id: Uuid) -> Result<Option<Loan>, LoanRepositoryError>;

    /// A user's active loans joined with book summaries, newest first.
    async fn list_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<LoanWithBook>, LoanRepositoryError>;

    /// A user's returned loans joined with book summaries, newest first.
    async fn list_history_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<LoanWithBook>, LoanRepositoryError>;

    /// Every active loan joined with book and borrower, newest first.
    async fn list_all_active(&self) -> Result<Vec<LoanWithBorrower>, LoanRepositoryError>;
}

/// Fixture implementation for tests that do not exercise loans.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoanRepository;

#[async_trait]
impl LoanRepository for FixtureLoanRepository {
    async fn create_active(&self, _loan: &Loan) -> Result<(), LoanRepositoryError> {
        Ok(())
    }

    async fn mark_returned(&self, loan_id: Uuid) -> Result<Loan, LoanRepositoryError> {
        Err(LoanRepositoryError::NotFound { loan_id })
    }

    async fn find(&self, _loan_id: Uuid) -> Result<Option<Loan>, LoanRepositoryError> {
        Ok(None)
    }

    async fn list_active_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<LoanWithBook>, LoanRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_history_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<LoanWithBook>, LoanRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_all_active(&self) -> Result<Vec<LoanWithBorrower>, LoanRepositoryError> {
        Ok(Vec::new())
    }
}
