//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API: every
//! endpoint from the inbound layer, the domain and request/response schemas,
//! and the session cookie security scheme. The generated document backs
//! Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Book, BookSummary, Comment, CommentWithAuthor, Error, ErrorCode, InventoryRecord, Loan,
    LoanStatus, LoanWithBook, LoanWithBorrower, User,
};
use crate::inbound::http::books::{
    BookBody, CategoryBody, CreateBookRequestBody, SearchResponseBody, SetStockRequestBody,
    StockBody, UpdateBookRequestBody,
};
use crate::inbound::http::comments::AddCommentRequestBody;
use crate::inbound::http::loans::BorrowRequestBody;
use crate::inbound::http::users::{LoginRequestBody, RegisterRequestBody};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Library catalogue API",
        description = "HTTP interface for browsing the catalogue, borrowing books, \
                       rating them, and managing accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::books::list_books,
        crate::inbound::http::books::featured_books,
        crate::inbound::http::books::list_categories,
        crate::inbound::http::books::search_books,
        crate::inbound::http::books::get_book,
        crate::inbound::http::books::create_book,
        crate::inbound::http::books::update_book,
        crate::inbound::http::books::delete_book,
        crate::inbound::http::books::set_stock,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::add_comment,
        crate::inbound::http::loans::borrow_book,
        crate::inbound::http::loans::return_loan,
        crate::inbound::http::loans::list_active_loans,
        crate::inbound::http::loans::list_loan_history,
        crate::inbound::http::loans::list_all_active_loans,
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Book,
        BookSummary,
        InventoryRecord,
        Loan,
        LoanStatus,
        LoanWithBook,
        LoanWithBorrower,
        Comment,
        CommentWithAuthor,
        User,
        BookBody,
        CategoryBody,
        SearchResponseBody,
        CreateBookRequestBody,
        UpdateBookRequestBody,
        SetStockRequestBody,
        StockBody,
        BorrowRequestBody,
        AddCommentRequestBody,
        RegisterRequestBody,
        LoginRequestBody,
    )),
    tags(
        (name = "books", description = "Catalogue browsing and administration"),
        (name = "loans", description = "Borrowing and returning books"),
        (name = "comments", description = "Ratings and reviews"),
        (name = "users", description = "Accounts and sessions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
