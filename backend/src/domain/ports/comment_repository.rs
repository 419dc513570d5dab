//! Port for comment persistence and rating reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, CommentWithAuthor};

/// Errors raised by comment repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentRepositoryError {
    /// Repository connection could not be established.
    #[error("comment repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("comment repository query failed: {message}")]
    Query { message: String },

    /// The user has already commented on this book.
    #[error("user already commented on book {book_id}")]
    DuplicateComment { book_id: Uuid },
}

impl CommentRepositoryError {
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

/// Port for writing comments and reading comment projections.
///
/// Duplicate comments surface as
/// [`CommentRepositoryError::DuplicateComment`] from the unique
/// `(user, book)` index rather than from a point-in-time lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Persist a comment.
    async fn insert(&self, comment: &Comment) -> Result<(), CommentRepositoryError>;

    /// A book's comments joined with author names, newest first.
    async fn list_for_book(
        &self,
        book_id: Uuid,
    ) -> Result<Vec<CommentWithAuthor>, CommentRepositoryError>;

    /// The bare rating values for a book, for aggregation.
    async fn ratings_for(&self, book_id: Uuid) -> Result<Vec<i16>, CommentRepositoryError>;
}

/// Fixture implementation for tests that do not exercise comments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCommentRepository;

#[async_trait]
impl CommentRepository for FixtureCommentRepository {
    async fn insert(&self, _comment: &Comment) -> Result<(), CommentRepositoryError> {
        Ok(())
    }

    async fn list_for_book(
        &self,
        _book_id: Uuid,
    ) -> Result<Vec<CommentWithAuthor>, CommentRepositoryError> {
        Ok(Vec::new())
    }

    async fn ratings_for(&self, _book_id: Uuid) -> Result<Vec<i16>, CommentRepositoryError> {
        Ok(Vec::new())
    }
}
