//! Driving ports for catalogue queries and administration.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Book, Error, InventoryRecord, RatingSummary, UserId};

use super::{CatalogFilter, CategoryCount};

/// Book decorated with stock counts and the rating summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogBook {
    pub book: Book,
    pub total: i32,
    pub available: i32,
    pub rating: RatingSummary,
}

/// Search results: decorated books plus matching category labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub books: Vec<CatalogBook>,
    pub categories: Vec<String>,
}

/// Fields accepted when creating a book.
#[derive(Debug, Clone, Default)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cover_url: Option<String>,
}

/// Patch applied when editing a book; `None` fields stay untouched.
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cover_url: Option<String>,
}

/// Driving port for read-only catalogue views.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// List books matching the filter, decorated with stock and rating.
    async fn list_books(&self, filter: CatalogFilter) -> Result<Vec<CatalogBook>, Error>;

    /// Get a single decorated book.
    async fn get_book(&self, book_id: Uuid) -> Result<CatalogBook, Error>;

    /// The five best-rated books.
    async fn featured_books(&self) -> Result<Vec<CatalogBook>, Error>;

    /// Distinct category labels with counts, most populous first.
    async fn list_categories(&self) -> Result<Vec<CategoryCount>, Error>;

    /// Substring search over title, author, description, and category.
    async fn search(&self, term: String) -> Result<SearchResults, Error>;
}

/// Driving port for administrative catalogue mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogCommand: Send + Sync {
    /// Create a book and initialise its inventory.
    async fn create_book(&self, new_book: NewBook) -> Result<CatalogBook, Error>;

    /// Apply a patch to an existing book.
    async fn update_book(&self, book_id: Uuid, update: BookUpdate) -> Result<CatalogBook, Error>;

    /// Delete a book; refused while active loans exist.
    async fn delete_book(&self, book_id: Uuid) -> Result<(), Error>;

    /// Administrative stock override, audited.
    async fn set_stock(
        &self,
        book_id: Uuid,
        total: i32,
        available: i32,
        admin_id: UserId,
    ) -> Result<InventoryRecord, Error>;
}
