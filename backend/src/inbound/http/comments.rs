//! Comment HTTP handlers.
//!
//! ```text
//! GET  /api/v1/books/{id}/comments
//! POST /api/v1/books/{id}/comments
//! ```
//!
//! Reading comments is public; posting requires a logged-in session.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::AddCommentRequest;
use crate::domain::{Comment, CommentWithAuthor, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request payload for commenting on a book.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequestBody {
    /// Star rating between 1 and 5.
    pub rating: i16,
    /// Optional review text, at least 5 characters when present.
    pub content: Option<String>,
}

/// A book's comments with author names, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}/comments",
    params(("id" = String, Path, format = "uuid", description = "Book identifier")),
    responses(
        (status = 200, description = "Comments", body = [CommentWithAuthor]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown book", body = Error)
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
#[get("/books/{id}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CommentWithAuthor>>> {
    let book_id = parse_uuid(&path, FieldName::new("id"))?;
    let comments = state.comment_query.list_comments(book_id).await?;
    Ok(web::Json(comments))
}

/// Rate a book, optionally with text. One comment per user and book.
#[utoipa::path(
    post,
    path = "/api/v1/books/{id}/comments",
    params(("id" = String, Path, format = "uuid", description = "Book identifier")),
    request_body = AddCommentRequestBody,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown book", body = Error),
        (status = 409, description = "Already commented", body = Error)
    ),
    tags = ["comments"],
    operation_id = "addComment",
    security(("SessionCookie" = []))
)]
#[post("/books/{id}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AddCommentRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let book_id = parse_uuid(&path, FieldName::new("id"))?;
    let body = payload.into_inner();
    let comment = state
        .comment_command
        .add_comment(AddCommentRequest {
            user_id,
            book_id,
            rating: body.rating,
            content: body.content,
        })
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

#[cfg(test)]
#[path = "comments_tests.rs"]
mod tests;
