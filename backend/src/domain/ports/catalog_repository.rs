//! Port for book catalogue persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Book;

/// Errors raised by catalogue repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogRepositoryError {
    /// Repository connection could not be established.
    #[error("catalogue repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("catalogue repository query failed: {message}")]
    Query { message: String },

    /// Deletion refused because active loans reference the book.
    #[error("book has active loans")]
    ActiveLoans,
}

impl CatalogRepositoryError {
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

/// Filter for catalogue listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Restrict to an exact category label.
    pub category: Option<String>,
    /// Case-insensitive substring over title and author.
    pub search: Option<String>,
}

/// Category label with the number of books carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Port for reading and mutating catalogued books.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a book and its initial inventory record in one transaction.
    async fn insert_with_inventory(
        &self,
        book: &Book,
        initial_copies: i32,
    ) -> Result<(), CatalogRepositoryError>;

    /// Persist edits to an existing book.
    async fn update(&self, book: &Book) -> Result<(), CatalogRepositoryError>;

    /// Delete a book and its dependent records in one transaction.
    ///
    /// Fails with [`CatalogRepositoryError::ActiveLoans`] while any active
    /// loan references the book; otherwise inventory, stock history,
    /// comments, and returned loans go with it.
    async fn delete(&self, book_id: Uuid) -> Result<(), CatalogRepositoryError>;

    /// Find a book by id.
    async fn find(&self, book_id: Uuid) -> Result<Option<Book>, CatalogRepositoryError>;

    /// List books matching the filter, newest first.
    async fn list(&self, filter: &CatalogFilter) -> Result<Vec<Book>, CatalogRepositoryError>;

    /// Substring search over title, author, description, and category.
    async fn search(&self, term: &str) -> Result<Vec<Book>, CatalogRepositoryError>;

    /// Distinct category labels with book counts, most populous first.
    async fn categories(&self) -> Result<Vec<CategoryCount>, CatalogRepositoryError>;

    /// Number of catalogued books.
    async fn count(&self) -> Result<i64, CatalogRepositoryError>;
}

/// Fixture implementation for tests that do not exercise the catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogRepository;

#[async_trait]
impl CatalogRepository for FixtureCatalogRepository {
    async fn insert_with_inventory(
        &self,
        _book: &Book,
        _initial_copies: i32,
    ) -> Result<(), CatalogRepositoryError> {
        Ok(())
    }

    async fn update(&self, _book: &Book) -> Result<(), CatalogRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _book_id: Uuid) -> Result<(), CatalogRepositoryError> {
        Ok(())
    }

    async fn find(&self, _book_id: Uuid) -> Result<Option<Book>, CatalogRepositoryError> {
        Ok(None)
    }

    async fn list(&self, _filter: &CatalogFilter) -> Result<Vec<Book>, CatalogRepositoryError> {
        Ok(Vec::new())
    }

    async fn search(&self, _term: &str) -> Result<Vec<Book>, CatalogRepositoryError> {
        Ok(Vec::new())
    }

    async fn categories(&self) -> Result<Vec<CategoryCount>, CatalogRepositoryError> {
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<i64, CatalogRepositoryError> {
        Ok(0)
    }
}
