//! PostgreSQL-backed `CommentRepository` implementation using Diesel ORM.
//!
//! The unique index on `(user_id, book_id)` is the single arbiter of the
//! one-comment-per-user-per-book rule; a second insert surfaces as a unique
//! violation rather than being caught by a prior lookup.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, CommentContent, CommentWithAuthor, DisplayName, Rating, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CommentRow, NewCommentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{comments, users};

/// Diesel-backed implementation of the comment repository port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> CommentRepositoryError {
    map_pool_error(error, CommentRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error, book_id: Uuid) -> CommentRepositoryError {
    map_diesel_error(
        error,
        CommentRepositoryError::query,
        CommentRepositoryError::connection,
        || CommentRepositoryError::DuplicateComment { book_id },
    )
}

/// Convert a database row into a validated domain comment.
fn row_to_comment(row: CommentRow) -> Result<Comment, CommentRepositoryError> {
    let rating = Rating::new(row.rating)
        .map_err(|err| CommentRepositoryError::query(err.to_string()))?;
    let content = row
        .content
        .map(CommentContent::new)
        .transpose()
        .map_err(|err| CommentRepositoryError::query(err.to_string()))?;
    Ok(Comment::from_parts(
        row.id,
        UserId::from_uuid(row.user_id),
        row.book_id,
        rating,
        content,
        row.created_at,
    ))
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), CommentRepositoryError> {
        let new_row = NewCommentRow {
            id: comment.id(),
            user_id: *comment.user_id().as_uuid(),
            book_id: comment.book_id(),
            rating: comment.rating().value(),
            content: comment.content().map(AsRef::as_ref),
            created_at: comment.created_at(),
        };

        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::insert_into(comments::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_diesel(error, comment.book_id()))
    }

    async fn list_for_book(
        &self,
        book_id: Uuid,
    ) -> Result<Vec<CommentWithAuthor>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<(CommentRow, String)> = comments::table
            .inner_join(users::table)
            .filter(comments::book_id.eq(book_id))
            .order(comments::created_at.desc())
            .select((CommentRow::as_select(), users::display_name))
            .load(&mut conn)
            .await
            .map_err(|error| map_diesel(error, book_id))?;

        rows.into_iter()
            .map(|(comment_row, author)| {
                Ok(CommentWithAuthor {
                    comment: row_to_comment(comment_row)?,
                    author: DisplayName::new(author)
                        .map_err(|err| CommentRepositoryError::query(err.to_string()))?,
                })
            })
            .collect()
    }

    async fn ratings_for(&self, book_id: Uuid) -> Result<Vec<i16>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        comments::table
            .filter(comments::book_id.eq(book_id))
            .select(comments::rating)
            .load(&mut conn)
            .await
            .map_err(|error| map_diesel(error, book_id))
    }
}
