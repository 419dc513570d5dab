//! PostgreSQL-backed `CatalogRepository` implementation using Diesel ORM.
//!
//! Persists catalogued books and rehydrates them through the validated
//! domain constructors. Book creation and deletion run as transactions so
//! the inventory record and dependent rows cannot drift out of step with
//! the catalogue.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    CatalogFilter, CatalogRepository, CatalogRepositoryError, CategoryCount,
};
use crate::domain::{Book, BookDraft, LoanStatus};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{BookChangeset, BookRow, NewBookRow, NewInventoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{books, comments, inventory, loan_events, loans, stock_history};

/// Diesel-backed implementation of the catalogue repository port.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> CatalogRepositoryError {
    map_pool_error(error, CatalogRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> CatalogRepositoryError {
    map_diesel_error(
        error,
        CatalogRepositoryError::query,
        CatalogRepositoryError::connection,
        // No unique index on books; a violation here is a plain query error.
        || CatalogRepositoryError::query("unexpected unique violation"),
    )
}

/// Convert a database row into a validated domain book.
fn row_to_book(row: BookRow) -> Result<Book, CatalogRepositoryError> {
    let BookRow {
        id,
        title,
        author,
        published_year,
        description,
        category,
        cover_url,
        created_at,
    } = row;

    Book::new(BookDraft {
        id,
        title,
        author,
        published_year,
        description,
        category: Some(category),
        cover_url: Some(cover_url),
        created_at,
    })
    .map_err(|err| CatalogRepositoryError::query(err.to_string()))
}

fn rows_to_books(rows: Vec<BookRow>) -> Result<Vec<Book>, CatalogRepositoryError> {
    rows.into_iter().map(row_to_book).collect()
}

/// Error type threaded through the delete transaction so an active-loan
/// refusal rolls back without being conflated with a database failure.
#[derive(Debug)]
enum DeleteTxError {
    ActiveLoans,
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for DeleteTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

#[async_trait]
impl CatalogRepository for DieselCatalogRepository {
    async fn insert_with_inventory(
        &self,
        book: &Book,
        initial_copies: i32,
    ) -> Result<(), CatalogRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let new_row = NewBookRow {
            id: book.id(),
            title: book.title(),
            author: book.author(),
            published_year: book.published_year(),
            description: book.description(),
            category: book.category(),
            cover_url: book.cover_url(),
            created_at: book.created_at(),
        };
        let inventory_row = NewInventoryRow {
            book_id: book.id(),
            total: initial_copies,
            available: initial_copies,
        };

        let mut conn = self.pool.get().await.map_err(map_pool)?;

        // One transaction so a book never exists without its ledger record.
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(books::table)
                    .values(&new_row)
                    .execute(conn)
                    .await?;

                diesel::insert_into(inventory::table)
                    .values(&inventory_row)
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn update(&self, book: &Book) -> Result<(), CatalogRepositoryError> {
        let changeset = BookChangeset {
            title: book.title(),
            author: book.author(),
            published_year: book.published_year(),
            description: book.description(),
            category: book.category(),
            cover_url: book.cover_url(),
        };

        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let updated = diesel::update(books::table.find(book.id()))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if updated == 0 {
            return Err(CatalogRepositoryError::query("book not found"));
        }
        Ok(())
    }

    async fn delete(&self, book_id: Uuid) -> Result<(), CatalogRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool)?;

        conn.transaction(|conn| {
            async move {
                let active: i64 = loans::table
                    .filter(loans::book_id.eq(book_id))
                    .filter(loans::status.eq(LoanStatus::Active.as_str()))
                    .count()
                    .get_result(conn)
                    .await?;
                if active > 0 {
                    return Err(DeleteTxError::ActiveLoans);
                }

                let loan_ids = loans::table
                    .filter(loans::book_id.eq(book_id))
                    .select(loans::id);
                diesel::delete(loan_events::table.filter(loan_events::loan_id.eq_any(loan_ids)))
                    .execute(conn)
                    .await?;
                diesel::delete(loans::table.filter(loans::book_id.eq(book_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(comments::table.filter(comments::book_id.eq(book_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(stock_history::table.filter(stock_history::book_id.eq(book_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(inventory::table.filter(inventory::book_id.eq(book_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(books::table.find(book_id)).execute(conn).await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| match error {
            DeleteTxError::ActiveLoans => CatalogRepositoryError::ActiveLoans,
            DeleteTxError::Diesel(error) => map_diesel(error),
        })
    }

    async fn find(&self, book_id: Uuid) -> Result<Option<Book>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = books::table
            .find(book_id)
            .select(BookRow::as_select())
            .first::<BookRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_book).transpose()
    }

    async fn list(&self, filter: &CatalogFilter) -> Result<Vec<Book>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let mut query = books::table.into_boxed();
        if let Some(category) = &filter.category {
            query = query.filter(books::category.eq(category.clone()));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query = query.filter(
                books::title
                    .ilike(pattern.clone())
                    .or(books::author.ilike(pattern)),
            );
        }

        let rows: Vec<BookRow> = query
            .order(books::created_at.desc())
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows_to_books(rows)
    }

    async fn search(&self, term: &str) -> Result<Vec<Book>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let pattern = format!("%{term}%");
        let rows: Vec<BookRow> = books::table
            .filter(
                books::title
                    .ilike(pattern.clone())
                    .or(books::author.ilike(pattern.clone()))
                    .or(books::description.ilike(pattern.clone()))
                    .or(books::category.ilike(pattern)),
            )
            .order(books::created_at.desc())
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows_to_books(rows)
    }

    async fn categories(&self) -> Result<Vec<CategoryCount>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<(String, i64)> = books::table
            .group_by(books::category)
            .select((books::category, diesel::dsl::count_star()))
            .order(diesel::dsl::count_star().desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(rows
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect())
    }

    async fn count(&self) -> Result<i64, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        books::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)
    }
}
