//! Comment domain service.
//!
//! Validates ratings and comment text, checks that the target book exists,
//! and delegates persistence to the comment repository. The one-comment-per
//! `(user, book)` rule is enforced by the repository's unique index and
//! surfaces here as a conflict.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{
    AddCommentRequest, CatalogRepository, CatalogRepositoryError, CommentCommand, CommentQuery,
    CommentRepository, CommentRepositoryError,
};
use crate::domain::{Comment, CommentContent, CommentWithAuthor, Error, Rating};

fn map_comment_repository_error(error: CommentRepositoryError) -> Error {
    match error {
        CommentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("comment repository unavailable: {message}"))
        }
        CommentRepositoryError::Query { message } => {
            Error::internal(format!("comment repository error: {message}"))
        }
        CommentRepositoryError::DuplicateComment { .. } => {
            Error::conflict("you have already commented on this book")
                .with_details(json!({ "code": "duplicate_comment" }))
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

/// Comment service implementing the command and query driving ports.
#[derive(Clone)]
pub struct CommentService<M, C> {
    comment_repo: Arc<M>,
    catalog_repo: Arc<C>,
}

impl<M, C> CommentService<M, C> {
    /// Create a new service over the comment and catalogue repositories.
    pub fn new(comment_repo: Arc<M>, catalog_repo: Arc<C>) -> Self {
        Self {
            comment_repo,
            catalog_repo,
        }
    }
}

impl<M, C> CommentService<M, C>
where
    M: CommentRepository,
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
impl<M, C> CommentCommand for CommentService<M, C>
where
    M: CommentRepository,
    C: CatalogRepository,
{
    async fn add_comment(&self, request: AddCommentRequest) -> Result<Comment, Error> {
        let rating = Rating::new(request.rating).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "rating",
                "value": request.rating,
            }))
        })?;
        let content = request
            .content
            .filter(|text| !text.trim().is_empty())
            .map(CommentContent::new)
            .transpose()
            .map_err(|err| {
                Error::invalid_request(err.to_string())
                    .with_details(json!({ "field": "content" }))
            })?;

        self.require_book(request.book_id).await?;

        let comment = Comment::new(request.user_id, request.book_id, rating, content);
        self.comment_repo
            .insert(&comment)
            .await
            .map_err(map_comment_repository_error)?;

        Ok(comment)
    }
}

#[async_trait]
impl<M, C> CommentQuery for CommentService<M, C>
where
    M: CommentRepository,
    C: CatalogRepository,
{
    async fn list_comments(&self, book_id: Uuid) -> Result<Vec<CommentWithAuthor>, Error> {
        self.require_book(book_id).await?;
        self.comment_repo
            .list_for_book(book_id)
            .await
            .map_err(map_comment_repository_error)
    }
}

#[cfg(test)]
#[path = "comment_service_tests.rs"]
mod tests;
