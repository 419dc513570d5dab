//! PostgreSQL-backed `LoanRepository` implementation using Diesel ORM.
//!
//! Borrow and return each run as one transaction covering the loan row, the
//! availability update, and the audit event. Concurrency is resolved by the
//! database: the conditional availability decrement refuses to go below
//! zero, and the partial unique index on active loans rejects a second
//! borrow of the same book by the same user.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{LoanRepository, LoanRepositoryError};
use crate::domain::{
    BookSummary, DisplayName, Loan, LoanEventKind, LoanStatus, LoanWithBook, LoanWithBorrower,
    UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{LoanRow, NewLoanEventRow, NewLoanRow};
use super::pool::{DbPool, PoolError};
use super::schema::{books, inventory, loan_events, loans, users};

/// Diesel-backed implementation of the loan repository port.
#[derive(Clone)]
pub struct DieselLoanRepository {
    pool: DbPool,
}

impl DieselLoanRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> LoanRepositoryError {
    map_pool_error(error, LoanRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> LoanRepositoryError {
    map_diesel_error(
        error,
        LoanRepositoryError::query,
        LoanRepositoryError::connection,
        || LoanRepositoryError::query("unexpected unique violation"),
    )
}

/// Convert a database row into a domain loan.
fn row_to_loan(row: LoanRow) -> Result<Loan, LoanRepositoryError> {
    let status: LoanStatus = row
        .status
        .parse()
        .map_err(|err: String| LoanRepositoryError::query(err))?;
    Ok(Loan::from_parts(
        row.id,
        UserId::from_uuid(row.user_id),
        row.book_id,
        row.start_date,
        row.due_date,
        status,
    ))
}

type BookSummaryColumns = (Uuid, String, String, String);

fn to_book_summary((id, title, author, cover_url): BookSummaryColumns) -> BookSummary {
    BookSummary {
        id,
        title,
        author,
        cover_url,
    }
}

fn new_event_row(loan_id: Uuid, kind: LoanEventKind) -> NewLoanEventRow<'static> {
    NewLoanEventRow {
        id: Uuid::new_v4(),
        loan_id,
        kind: kind.as_str(),
        recorded_at: chrono::Utc::now(),
    }
}

/// Error type threaded through the borrow transaction.
#[derive(Debug)]
enum BorrowTxError {
    Unavailable,
    DuplicateActiveLoan,
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for BorrowTxError {
    fn from(error: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                Self::DuplicateActiveLoan
            }
            other => Self::Diesel(other),
        }
    }
}

/// Error type threaded through the return transaction.
#[derive(Debug)]
enum ReturnTxError {
    NotFound,
    AlreadyReturned,
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for ReturnTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

#[async_trait]
impl LoanRepository for DieselLoanRepository {
    async fn create_active(&self, loan: &Loan) -> Result<(), LoanRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let book_id = loan.book_id();
        let new_row = NewLoanRow {
            id: loan.id(),
            user_id: *loan.user_id().as_uuid(),
            book_id,
            start_date: loan.start_date(),
            due_date: loan.due_date(),
            status: loan.status().as_str(),
        };
        let event_row = new_event_row(loan.id(), LoanEventKind::Created);

        let mut conn = self.pool.get().await.map_err(map_pool)?;

        conn.transaction(|conn| {
            async move {
                // Conditional decrement: matches zero rows when no copy is
                // left, so two racing borrowers cannot both take the last
                // copy.
                let decremented = diesel::update(
                    inventory::table
                        .find(book_id)
                        .filter(inventory::available.gt(0)),
                )
                .set(inventory::available.eq(inventory::available - 1))
                .execute(conn)
                .await?;
                if decremented == 0 {
                    return Err(BorrowTxError::Unavailable);
                }

                // The partial unique index on active loans turns a repeat
                // borrow into a unique violation here.
                diesel::insert_into(loans::table)
                    .values(&new_row)
                    .execute(conn)
                    .await?;

                diesel::insert_into(loan_events::table)
                    .values(&event_row)
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| match error {
            BorrowTxError::Unavailable => LoanRepositoryError::BookUnavailable { book_id },
            BorrowTxError::DuplicateActiveLoan => {
                LoanRepositoryError::DuplicateActiveLoan { book_id }
            }
            BorrowTxError::Diesel(error) => map_diesel(error),
        })
    }

    async fn mark_returned(&self, loan_id: Uuid) -> Result<Loan, LoanRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    // Conditional status flip: only an active loan matches,
                    // so a double return loses here instead of incrementing
                    // availability twice.
                    let returned: Option<LoanRow> = diesel::update(
                        loans::table
                            .find(loan_id)
                            .filter(loans::status.eq(LoanStatus::Active.as_str())),
                    )
                    .set(loans::status.eq(LoanStatus::Returned.as_str()))
                    .returning(LoanRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;

                    let Some(row) = returned else {
                        let exists: i64 = loans::table
                            .find(loan_id)
                            .count()
                            .get_result(conn)
                            .await?;
                        return Err(if exists == 0 {
                            ReturnTxError::NotFound
                        } else {
                            ReturnTxError::AlreadyReturned
                        });
                    };

                    // Clamped increment: a no-op when availability already
                    // equals the total (an admin may have shrunk the stock
                    // while the copy was out).
                    diesel::update(
                        inventory::table
                            .find(row.book_id)
                            .filter(inventory::available.lt(inventory::total)),
                    )
                    .set(inventory::available.eq(inventory::available + 1))
                    .execute(conn)
                    .await?;

                    diesel::insert_into(loan_events::table)
                        .values(&new_event_row(loan_id, LoanEventKind::Returned))
                        .execute(conn)
                        .await?;

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|error| match error {
                ReturnTxError::NotFound => LoanRepositoryError::NotFound { loan_id },
                ReturnTxError::AlreadyReturned => LoanRepositoryError::AlreadyReturned { loan_id },
                ReturnTxError::Diesel(error) => map_diesel(error),
            })?;

        row_to_loan(row)
    }

    async fn find(&self, loan_id: Uuid) -> Result<Option<Loan>, LoanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = loans::table
            .find(loan_id)
            .select(LoanRow::as_select())
            .first::<LoanRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_loan).transpose()
    }

    async fn list_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<LoanWithBook>, LoanRepositoryError> {
        self.list_for_user(user_id, LoanStatus::Active).await
    }

    async fn list_history_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<LoanWithBook>, LoanRepositoryError> {
        self.list_for_user(user_id, LoanStatus::Returned).await
    }

    async fn list_all_active(&self) -> Result<Vec<LoanWithBorrower>, LoanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<(LoanRow, BookSummaryColumns, String)> = loans::table
            .inner_join(books::table)
            .inner_join(users::table)
            .filter(loans::status.eq(LoanStatus::Active.as_str()))
            .order((loans::start_date.desc(), loans::id.desc()))
            .select((
                LoanRow::as_select(),
                (books::id, books::title, books::author, books::cover_url),
                users::display_name,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter()
            .map(|(loan_row, book_columns, borrower)| {
                Ok(LoanWithBorrower {
                    loan: row_to_loan(loan_row)?,
                    book: to_book_summary(book_columns),
                    borrower: DisplayName::new(borrower)
                        .map_err(|err| LoanRepositoryError::query(err.to_string()))?,
                })
            })
            .collect()
    }
}

impl DieselLoanRepository {
    async fn list_for_user(
        &self,
        user_id: &UserId,
        status: LoanStatus,
    ) -> Result<Vec<LoanWithBook>, LoanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<(LoanRow, BookSummaryColumns)> = loans::table
            .inner_join(books::table)
            .filter(loans::user_id.eq(user_id.as_uuid()))
            .filter(loans::status.eq(status.as_str()))
            .order((loans::start_date.desc(), loans::id.desc()))
            .select((
                LoanRow::as_select(),
                (books::id, books::title, books::author, books::cover_url),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter()
            .map(|(loan_row, book_columns)| {
                Ok(LoanWithBook {
                    loan: row_to_loan(loan_row)?,
                    book: to_book_summary(book_columns),
                })
            })
            .collect()
    }
}
