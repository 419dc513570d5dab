//! Driving ports for the loan lifecycle.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Loan, LoanWithBook, LoanWithBorrower, UserId};

/// Request to borrow a book.
#[derive(Debug, Clone)]
pub struct BorrowRequest {
    pub user_id: UserId,
    pub book_id: Uuid,
    /// Days until the loan is due; defaults to 30 when omitted.
    pub duration_days: Option<i64>,
}

/// Request to return a loan.
#[derive(Debug, Clone)]
pub struct ReturnRequest {
    pub loan_id: Uuid,
    pub user_id: UserId,
    /// Administrators may return any user's loan.
    pub is_admin: bool,
}

/// Driving port for loan mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanCommand: Send + Sync {
    /// Borrow a book, creating an active loan.
    async fn borrow(&self, request: BorrowRequest) -> Result<Loan, Error>;

    /// Return an active loan.
    async fn return_loan(&self, request: ReturnRequest) -> Result<Loan, Error>;
}

/// Driving port for loan listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanQuery: Send + Sync {
    /// A user's active loans.
    async fn list_active(&self, user_id: UserId) -> Result<Vec<LoanWithBook>, Error>;

    /// A user's returned loans.
    async fn list_history(&self, user_id: UserId) -> Result<Vec<LoanWithBook>, Error>;

    /// Every active loan with borrower details. Admin view.
    async fn list_all_active(&self) -> Result<Vec<LoanWithBorrower>, Error>;
}
