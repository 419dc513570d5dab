//! Driving ports for book comments.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, CommentWithAuthor, Error, UserId};

/// Request to comment on a book.
#[derive(Debug, Clone)]
pub struct AddCommentRequest {
    pub user_id: UserId,
    pub book_id: Uuid,
    pub rating: i16,
    pub content: Option<String>,
}

/// Driving port for creating comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentCommand: Send + Sync {
    /// Add a comment; at most one per user and book.
    async fn add_comment(&self, request: AddCommentRequest) -> Result<Comment, Error>;
}

/// Driving port for reading comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentQuery: Send + Sync {
    /// A book's comments with author names, newest first.
    async fn list_comments(&self, book_id: Uuid) -> Result<Vec<CommentWithAuthor>, Error>;
}
