//! Loan lifecycle domain service.
//!
//! Implements the loan driving ports over the loan and catalogue repository
//! ports. Consistency-critical mutations (borrow, return) are delegated to
//! the repository as single transactions; this service contributes request
//! validation, existence checks, and ownership rules.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{
    BorrowRequest, CatalogRepository, CatalogRepositoryError, LoanCommand, LoanQuery,
    LoanRepository, LoanRepositoryError, ReturnRequest,
};
use crate::domain::{Error, Loan, LoanDuration, LoanWithBook, LoanWithBorrower, UserId};

fn map_loan_repository_error(error: LoanRepositoryError) -> Error {
    match error {
        LoanRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("loan repository unavailable: {message}"))
        }
        LoanRepositoryError::Query { message } => {
            Error::internal(format!("loan repository error: {message}"))
        }
        LoanRepositoryError::DuplicateActiveLoan { .. } => {
            Error::conflict("you already have an active loan for this book")
                .with_details(json!({ "code": "duplicate_active_loan" }))
        }
        LoanRepositoryError::BookUnavailable { .. } => {
            Error::conflict("no copies of this book are available")
                .with_details(json!({ "code": "book_unavailable" }))
        }
        LoanRepositoryError::NotFound { loan_id } => {
            Error::not_found(format!("loan {loan_id} not found"))
        }
        LoanRepositoryError::AlreadyReturned { .. } => {
            Error::conflict("loan has already been returned")
                .with_details(json!({ "code": "already_returned" }))
        }
    }
}

fn map_catalog_repository_error(error: CatalogRepositoryError) -> Error {
    match error {
        CatalogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalogue repository unavailable: {message}"))
        }
        CatalogRepositoryError::Query { message } => {
            Error::internal(format!("catalogue repository error: {message}"))
        }
        CatalogRepositoryError::ActiveLoans => Error::conflict("book has active loans"),
    }
}

fn parse_duration(duration_days: Option<i64>) -> Result<LoanDuration, Error> {
    match duration_days {
        Some(days) => LoanDuration::new(days).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "durationDays",
                "value": days,
                "code": "invalid_duration",
            }))
        }),
        None => Ok(LoanDuration::default_duration()),
    }
}

/// Loan service implementing the command and query driving ports.
#[derive(Clone)]
pub struct LoanService<L, C> {
    loan_repo: Arc<L>,
    catalog_repo: Arc<C>,
}

impl<L, C> LoanService<L, C> {
    /// Create a new service over the loan and catalogue repositories.
    pub fn new(loan_repo: Arc<L>, catalog_repo: Arc<C>) -> Self {
        Self {
            loan_repo,
            catalog_repo,
        }
    }
}

impl<L, C> LoanService<L, C>
where
    L: LoanRepository,
    C: CatalogRepository,
{
    async fn require_book(&self, book_id: Uuid) -> Result<(), Error> {
        self.catalog_repo
            .find(book_id)
            .await
            .map_err(map_catalog_repository_error)?
            .ok_or_else(|| Error::not_found(format!("book {book_id} not found")))?;
        Ok(())
    }
}

#[async_trait]
impl<L, C> LoanCommand for LoanService<L, C>
where
    L: LoanRepository,
    C: CatalogRepository,
{
    async fn borrow(&self, request: BorrowRequest) -> Result<Loan, Error> {
        let duration = parse_duration(request.duration_days)?;
        self.require_book(request.book_id).await?;

        let loan = Loan::start(
            request.user_id,
            request.book_id,
            Utc::now().date_naive(),
            duration,
        );
        self.loan_repo
            .create_active(&loan)
            .await
            .map_err(map_loan_repository_error)?;

        Ok(loan)
    }

    async fn return_loan(&self, request: ReturnRequest) -> Result<Loan, Error> {
        let loan = self
            .loan_repo
            .find(request.loan_id)
            .await
            .map_err(map_loan_repository_error)?
            .ok_or_else(|| Error::not_found(format!("loan {} not found", request.loan_id)))?;

        if loan.user_id() != &request.user_id && !request.is_admin {
            return Err(Error::forbidden("loan belongs to another user"));
        }

        self.loan_repo
            .mark_returned(request.loan_id)
            .await
            .map_err(map_loan_repository_error)
    }
}

#[async_trait]
impl<L, C> LoanQuery for LoanService<L, C>
where
    L: LoanRepository,
    C: CatalogRepository,
{
    async fn list_active(&self, user_id: UserId) -> Result<Vec<LoanWithBook>, Error> {
        self.loan_repo
            .list_active_for_user(&user_id)
            .await
            .map_err(map_loan_repository_error)
    }

    async fn list_history(&self, user_id: UserId) -> Result<Vec<LoanWithBook>, Error> {
        self.loan_repo
            .list_history_for_user(&user_id)
            .await
            .map_err(map_loan_repository_error)
    }

    async fn list_all_active(&self) -> Result<Vec<LoanWithBorrower>, Error> {
        self.loan_repo
            .list_all_active()
            .await
            .map_err(map_loan_repository_error)
    }
}

#[cfg(test)]
#[path = "loan_service_tests.rs"]
mod tests;
