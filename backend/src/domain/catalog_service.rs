//! Catalogue domain service.
//!
//! Implements the catalogue driving ports over the catalogue, inventory, and
//! comment repositories. Listing reads decorate each book with its stock
//! counts and a freshly computed rating summary.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{
    BookUpdate, CatalogBook, CatalogCommand, CatalogFilter, CatalogQuery, CatalogRepository,
    CatalogRepositoryError, CategoryCount, CommentRepository, CommentRepositoryError,
    InventoryRepository, InventoryRepositoryError, NewBook, SearchResults,
};
use crate::domain::{
    Book, BookDraft, DEFAULT_TOTAL_COPIES, Error, InventoryRecord, RatingSummary, UserId,
};

/// Number of books returned by the featured listing.
pub const FEATURED_BOOK_COUNT: usize = 5;

fn map_catalog_repository_error(error: CatalogRepositoryError) -> Error {
    match error {
        CatalogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalogue repository unavailable: {message}"))
        }
        CatalogRepositoryError::Query { message } => {
            Error::internal(format!("catalogue repository error: {message}"))
        }
        CatalogRepositoryError::ActiveLoans => {
            Error::conflict("book cannot be deleted while loans are active")
                .with_details(json!({ "code": "active_loans" }))
        }
    }
}

fn map_inventory_repository_error(error: InventoryRepositoryError) -> Error {
    match error {
        InventoryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("inventory repository unavailable: {message}"))
        }
        InventoryRepositoryError::Query { message } => {
            Error::internal(format!("inventory repository error: {message}"))
        }
        InventoryRepositoryError::DuplicateRecord { book_id } => {
            Error::conflict(format!("inventory already initialised for book {book_id}"))
        }
        InventoryRepositoryError::NotFound { book_id } => {
            Error::not_found(format!("no inventory record for book {book_id}"))
        }
        InventoryRepositoryError::InsufficientStock { .. } => {
            Error::conflict("no copies of this book are available")
                .with_details(json!({ "code": "book_unavailable" }))
        }
        InventoryRepositoryError::CapacityExceeded { .. } => {
            Error::conflict("availability would exceed total copies")
                .with_details(json!({ "code": "capacity_exceeded" }))
        }
    }
}

fn map_comment_repository_error(error: CommentRepositoryError) -> Error {
    match error {
        CommentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("comment repository unavailable: {message}"))
        }
        CommentRepositoryError::Query { message } => {
            Error::internal(format!("comment repository error: {message}"))
        }
        CommentRepositoryError::DuplicateComment { .. } => {
            Error::conflict("user already commented on this book")
        }
    }
}

/// Catalogue service implementing the query and command driving ports.
#[derive(Clone)]
pub struct CatalogService<C, I, M> {
    catalog_repo: Arc<C>,
    inventory_repo: Arc<I>,
    comment_repo: Arc<M>,
}

impl<C, I, M> CatalogService<C, I, M> {
    /// Create a new service over the catalogue, inventory, and comment
    /// repositories.
    pub fn new(catalog_repo: Arc<C>, inventory_repo: Arc<I>, comment_repo: Arc<M>) -> Self {
        Self {
            catalog_repo,
            inventory_repo,
            comment_repo,
        }
    }
}

impl<C, I, M> CatalogService<C, I, M>
where
    C: CatalogRepository,
    I: InventoryRepository,
    M: CommentRepository,
{
    async fn decorate(&self, book: Book) -> Result<CatalogBook, Error> {
        let counts = self
            .inventory_repo
            .get(book.id())
            .await
            .map_err(map_inventory_repository_error)?;
        let (total, available) = counts
            .map(|record| (record.total(), record.available()))
            .unwrap_or((0, 0));

        let ratings = self
            .comment_repo
            .ratings_for(book.id())
            .await
            .map_err(map_comment_repository_error)?;

        Ok(CatalogBook {
            book,
            total,
            available,
            rating: RatingSummary::from_ratings(&ratings),
        })
    }

    async fn decorate_all(&self, books: Vec<Book>) -> Result<Vec<CatalogBook>, Error> {
        let mut decorated = Vec::with_capacity(books.len());
        for book in books {
            decorated.push(self.decorate(book).await?);
        }
        Ok(decorated)
    }

    async fn require_book(&self, book_id: Uuid) -> Result<Book, Error> {
        self.catalog_repo
            .find(book_id)
            .await
            .map_err(map_catalog_repository_error)?
            .ok_or_else(|| Error::not_found(format!("book {book_id} not found")))
    }
}

#[async_trait]
impl<C, I, M> CatalogQuery for CatalogService<C, I, M>
where
    C: CatalogRepository,
    I: InventoryRepository,
    M: CommentRepository,
{
    async fn list_books(&self, filter: CatalogFilter) -> Result<Vec<CatalogBook>, Error> {
        let books = self
            .catalog_repo
            .list(&filter)
            .await
            .map_err(map_catalog_repository_error)?;
        self.decorate_all(books).await
    }

    async fn get_book(&self, book_id: Uuid) -> Result<CatalogBook, Error> {
        let book = self.require_book(book_id).await?;
        self.decorate(book).await
    }

    async fn featured_books(&self) -> Result<Vec<CatalogBook>, Error> {
        let books = self
            .catalog_repo
            .list(&CatalogFilter::default())
            .await
            .map_err(map_catalog_repository_error)?;
        let mut decorated = self.decorate_all(books).await?;
        decorated.sort_by(|a, b| {
            b.rating
                .average
                .total_cmp(&a.rating.average)
                .then_with(|| b.rating.count.cmp(&a.rating.count))
        });
        decorated.truncate(FEATURED_BOOK_COUNT);
        Ok(decorated)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryCount>, Error> {
        self.catalog_repo
            .categories()
            .await
            .map_err(map_catalog_repository_error)
    }

    async fn search(&self, term: String) -> Result<SearchResults, Error> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Ok(SearchResults {
                books: Vec::new(),
                categories: Vec::new(),
            });
        }

        let books = self
            .catalog_repo
            .search(trimmed)
            .await
            .map_err(map_catalog_repository_error)?;
        let needle = trimmed.to_lowercase();
        let categories = self
            .catalog_repo
            .categories()
            .await
            .map_err(map_catalog_repository_error)?
            .into_iter()
            .filter(|entry| entry.category.to_lowercase().contains(&needle))
            .map(|entry| entry.category)
            .collect();

        Ok(SearchResults {
            books: self.decorate_all(books).await?,
            categories,
        })
    }
}

#[async_trait]
impl<C, I, M> CatalogCommand for CatalogService<C, I, M>
where
    C: CatalogRepository,
    I: InventoryRepository,
    M: CommentRepository,
{
    async fn create_book(&self, new_book: NewBook) -> Result<CatalogBook, Error> {
        let NewBook {
            title,
            author,
            published_year,
            description,
            category,
            cover_url,
        } = new_book;

        let book = Book::new(BookDraft {
            id: Uuid::new_v4(),
            title,
            author,
            published_year,
            description,
            category,
            cover_url,
            created_at: Utc::now(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.catalog_repo
            .insert_with_inventory(&book, DEFAULT_TOTAL_COPIES)
            .await
            .map_err(map_catalog_repository_error)?;

        Ok(CatalogBook {
            book,
            total: DEFAULT_TOTAL_COPIES,
            available: DEFAULT_TOTAL_COPIES,
            rating: RatingSummary::empty(),
        })
    }

    async fn update_book(&self, book_id: Uuid, update: BookUpdate) -> Result<CatalogBook, Error> {
        let current = self.require_book(book_id).await?;

        let BookUpdate {
            title,
            author,
            published_year,
            description,
            category,
            cover_url,
        } = update;

        let edited = Book::new(BookDraft {
            id: current.id(),
            title: title.unwrap_or_else(|| current.title().to_owned()),
            author: author.unwrap_or_else(|| current.author().to_owned()),
            published_year: published_year.or(current.published_year()),
            description: description.or_else(|| current.description().map(ToOwned::to_owned)),
            category: Some(category.unwrap_or_else(|| current.category().to_owned())),
            cover_url: Some(cover_url.unwrap_or_else(|| current.cover_url().to_owned())),
            created_at: current.created_at(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.catalog_repo
            .update(&edited)
            .await
            .map_err(map_catalog_repository_error)?;
        self.decorate(edited).await
    }

    async fn delete_book(&self, book_id: Uuid) -> Result<(), Error> {
        self.require_book(book_id).await?;
        self.catalog_repo
            .delete(book_id)
            .await
            .map_err(map_catalog_repository_error)
    }

    async fn set_stock(
        &self,
        book_id: Uuid,
        total: i32,
        available: i32,
        admin_id: UserId,
    ) -> Result<InventoryRecord, Error> {
        if total < 0 || available < 0 || available > total {
            return Err(Error::invalid_request(
                "available copies must lie between 0 and the total",
            )
            .with_details(json!({
                "total": total,
                "available": available,
                "code": "invalid_range",
            })));
        }

        self.require_book(book_id).await?;
        self.inventory_repo
            .set_levels(book_id, total, available, &admin_id)
            .await
            .map_err(map_inventory_repository_error)
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;
