//! Catalogue HTTP handlers.
//!
//! ```text
//! GET    /api/v1/books
//! GET    /api/v1/books/featured
//! GET    /api/v1/books/categories
//! GET    /api/v1/books/search?q=term
//! GET    /api/v1/books/{id}
//! POST   /api/v1/books
//! PUT    /api/v1/books/{id}
//! DELETE /api/v1/books/{id}
//! PUT    /api/v1/books/{id}/stock
//! ```
//!
//! Mutating endpoints require an administrator session.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{BookUpdate, CatalogBook, CatalogFilter, NewBook};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Decorated book returned by catalogue endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookBody {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
    pub description: Option<String>,
    pub category: String,
    pub cover_url: String,
    #[schema(format = "date-time")]
    pub created_at: DateTime<Utc>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub average_rating: f64,
    pub ratings_count: u64,
}

impl From<CatalogBook> for BookBody {
    fn from(value: CatalogBook) -> Self {
        let CatalogBook {
            book,
            total,
            available,
            rating,
        } = value;
        Self {
            id: book.id(),
            title: book.title().to_owned(),
            author: book.author().to_owned(),
            published_year: book.published_year(),
            description: book.description().map(ToOwned::to_owned),
            category: book.category().to_owned(),
            cover_url: book.cover_url().to_owned(),
            created_at: book.created_at(),
            total_copies: total,
            available_copies: available,
            average_rating: rating.average,
            ratings_count: rating.count,
        }
    }
}

/// Category label with its book count.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBody {
    pub category: String,
    pub count: i64,
}

/// Search response combining book and category matches.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponseBody {
    pub books: Vec<BookBody>,
    pub categories: Vec<String>,
}

/// Filters accepted by the book listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListBooksQuery {
    /// Restrict to an exact category label.
    pub category: Option<String>,
    /// Case-insensitive substring over title and author.
    pub search: Option<String>,
}

/// Search term for `GET /books/search`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Term matched against titles, authors, descriptions, and categories.
    pub q: String,
}

/// Request payload for creating a book.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequestBody {
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cover_url: Option<String>,
}

/// Request payload for editing a book. Omitted fields stay untouched.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequestBody {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cover_url: Option<String>,
}

/// Request payload for the administrative stock override.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetStockRequestBody {
    pub total_copies: i32,
    pub available_copies: i32,
}

/// Stock levels returned after an override.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockBody {
    pub book_id: Uuid,
    pub total_copies: i32,
    pub available_copies: i32,
}

fn book_id_from_path(path: &str) -> Result<Uuid, Error> {
    parse_uuid(path, FieldName::new("id"))
}

/// List catalogued books, optionally filtered.
#[utoipa::path(
    get,
    path = "/api/v1/books",
    params(ListBooksQuery),
    responses(
        (status = 200, description = "Books", body = [BookBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["books"],
    operation_id = "listBooks",
    security([])
)]
#[get("/books")]
pub async fn list_books(
    state: web::Data<HttpState>,
    query: web::Query<ListBooksQuery>,
) -> ApiResult<web::Json<Vec<BookBody>>> {
    let query = query.into_inner();
    let filter = CatalogFilter {
        category: query.category,
        search: query.search,
    };
    let books = state.catalog_query.list_books(filter).await?;
    Ok(web::Json(books.into_iter().map(BookBody::from).collect()))
}

/// The five best-rated books.
#[utoipa::path(
    get,
    path = "/api/v1/books/featured",
    responses(
        (status = 200, description = "Featured books", body = [BookBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["books"],
    operation_id = "featuredBooks",
    security([])
)]
#[get("/books/featured")]
pub async fn featured_books(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<BookBody>>> {
    let books = state.catalog_query.featured_books().await?;
    Ok(web::Json(books.into_iter().map(BookBody::from).collect()))
}

/// Distinct category labels with book counts.
#[utoipa::path(
    get,
    path = "/api/v1/books/categories",
    responses(
        (status = 200, description = "Categories", body = [CategoryBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["books"],
    operation_id = "listCategories",
    security([])
)]
#[get("/books/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CategoryBody>>> {
    let categories = state.catalog_query.list_categories().await?;
    Ok(web::Json(
        categories
            .into_iter()
            .map(|entry| CategoryBody {
                category: entry.category,
                count: entry.count,
            })
            .collect(),
    ))
}

/// Search books and category labels.
#[utoipa::path(
    get,
    path = "/api/v1/books/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results", body = SearchResponseBody),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["books"],
    operation_id = "searchBooks",
    security([])
)]
#[get("/books/search")]
pub async fn search_books(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<SearchResponseBody>> {
    let results = state.catalog_query.search(query.into_inner().q).await?;
    Ok(web::Json(SearchResponseBody {
        books: results.books.into_iter().map(BookBody::from).collect(),
        categories: results.categories,
    }))
}

/// Fetch a single book with stock and rating.
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    params(("id" = String, Path, format = "uuid", description = "Book identifier")),
    responses(
        (status = 200, description = "Book", body = BookBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["books"],
    operation_id = "getBook",
    security([])
)]
#[get("/books/{id}")]
pub async fn get_book(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookBody>> {
    let book_id = book_id_from_path(&path)?;
    let book = state.catalog_query.get_book(book_id).await?;
    Ok(web::Json(BookBody::from(book)))
}

/// Add a book to the catalogue. Administrators only.
#[utoipa::path(
    post,
    path = "/api/v1/books",
    request_body = CreateBookRequestBody,
    responses(
        (status = 201, description = "Book created", body = BookBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["books"],
    operation_id = "createBook",
    security(("SessionCookie" = []))
)]
#[post("/books")]
pub async fn create_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateBookRequestBody>,
) -> ApiResult<HttpResponse> {
    state.require_admin(&session).await?;
    let body = payload.into_inner();
    let created = state
        .catalog_command
        .create_book(NewBook {
            title: body.title,
            author: body.author,
            published_year: body.published_year,
            description: body.description,
            category: body.category,
            cover_url: body.cover_url,
        })
        .await?;
    Ok(HttpResponse::Created().json(BookBody::from(created)))
}

/// Edit a catalogued book. Administrators only.
#[utoipa::path(
    put,
    path = "/api/v1/books/{id}",
    params(("id" = String, Path, format = "uuid", description = "Book identifier")),
    request_body = UpdateBookRequestBody,
    responses(
        (status = 200, description = "Book updated", body = BookBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["books"],
    operation_id = "updateBook",
    security(("SessionCookie" = []))
)]
#[put("/books/{id}")]
pub async fn update_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateBookRequestBody>,
) -> ApiResult<web::Json<BookBody>> {
    state.require_admin(&session).await?;
    let book_id = book_id_from_path(&path)?;
    let body = payload.into_inner();
    let updated = state
        .catalog_command
        .update_book(
            book_id,
            BookUpdate {
                title: body.title,
                author: body.author,
                published_year: body.published_year,
                description: body.description,
                category: body.category,
                cover_url: body.cover_url,
            },
        )
        .await?;
    Ok(web::Json(BookBody::from(updated)))
}

/// Remove a book. Refused while active loans exist. Administrators only.
#[utoipa::path(
    delete,
    path = "/api/v1/books/{id}",
    params(("id" = String, Path, format = "uuid", description = "Book identifier")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Active loans exist", body = Error)
    ),
    tags = ["books"],
    operation_id = "deleteBook",
    security(("SessionCookie" = []))
)]
#[delete("/books/{id}")]
pub async fn delete_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.require_admin(&session).await?;
    let book_id = book_id_from_path(&path)?;
    state.catalog_command.delete_book(book_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Override a book's stock levels. Administrators only.
#[utoipa::path(
    put,
    path = "/api/v1/books/{id}/stock",
    params(("id" = String, Path, format = "uuid", description = "Book identifier")),
    request_body = SetStockRequestBody,
    responses(
        (status = 200, description = "Stock updated", body = StockBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["books"],
    operation_id = "setStock",
    security(("SessionCookie" = []))
)]
#[put("/books/{id}/stock")]
pub async fn set_stock(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SetStockRequestBody>,
) -> ApiResult<web::Json<StockBody>> {
    let admin_id = state.require_admin(&session).await?;
    let book_id = book_id_from_path(&path)?;
    let body = payload.into_inner();
    let record = state
        .catalog_command
        .set_stock(book_id, body.total_copies, body.available_copies, admin_id)
        .await?;
    Ok(web::Json(StockBody {
        book_id: record.book_id(),
        total_copies: record.total(),
        available_copies: record.available(),
    }))
}

#[cfg(test)]
#[path = "books_tests.rs"]
mod tests;
