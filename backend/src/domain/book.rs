//! Book data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Category assigned when a book is created without one.
pub const DEFAULT_CATEGORY: &str = "General";
/// Cover image used when a book is created without one.
pub const DEFAULT_COVER_URL: &str = "/placeholder-book.jpg";

/// Validation errors returned by [`Book::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    EmptyTitle,
    EmptyAuthor,
    PublishedYearOutOfRange,
}

impl fmt::Display for BookValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyAuthor => write!(f, "author must not be empty"),
            Self::PublishedYearOutOfRange => {
                write!(f, "published year must be between 0 and 9999")
            }
        }
    }
}

impl std::error::Error for BookValidationError {}

/// Raw book fields prior to validation.
#[derive(Debug, Clone)]
pub struct BookDraft {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Catalogued book.
///
/// ## Invariants
/// - `title` and `author` are non-empty once trimmed.
/// - `category` and `cover_url` always carry a value; defaults are applied at
///   construction when the draft omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    id: Uuid,
    title: String,
    author: String,
    published_year: Option<i32>,
    description: Option<String>,
    category: String,
    cover_url: String,
    created_at: DateTime<Utc>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

impl Book {
    /// Build a validated [`Book`], applying category and cover defaults.
    pub fn new(draft: BookDraft) -> Result<Self, BookValidationError> {
        let BookDraft {
            id,
            title,
            author,
            published_year,
            description,
            category,
            cover_url,
            created_at,
        } = draft;

        let title = title.trim().to_owned();
        if title.is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        let author = author.trim().to_owned();
        if author.is_empty() {
            return Err(BookValidationError::EmptyAuthor);
        }
        if let Some(year) = published_year
            && !(0..=9999).contains(&year)
        {
            return Err(BookValidationError::PublishedYearOutOfRange);
        }

        Ok(Self {
            id,
            title,
            author,
            published_year,
            description: non_empty(description),
            category: non_empty(category).unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
            cover_url: non_empty(cover_url).unwrap_or_else(|| DEFAULT_COVER_URL.to_owned()),
            created_at,
        })
    }

    /// Stable book identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Book title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Book author.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Publication year, when known.
    pub fn published_year(&self) -> Option<i32> {
        self.published_year
    }

    /// Free-text description, when present.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Category label.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Cover image URL.
    pub fn cover_url(&self) -> &str {
        &self.cover_url
    }

    /// Record creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Compact book projection used in loan listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub cover_url: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id(),
            title: book.title().to_owned(),
            author: book.author().to_owned(),
            cover_url: book.cover_url().to_owned(),
        }
    }
}
