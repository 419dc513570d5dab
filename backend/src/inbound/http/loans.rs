//! Loan HTTP handlers.
//!
//! ```text
//! POST /api/v1/loans
//! POST /api/v1/loans/{id}/return
//! GET  /api/v1/loans
//! GET  /api/v1/loans/history
//! GET  /api/v1/admin/loans
//! ```
//!
//! Every endpoint requires a logged-in session; the admin overview also
//! requires administrator rights.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{BorrowRequest, ReturnRequest};
use crate::domain::{Error, Loan, LoanWithBook, LoanWithBorrower};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request payload for borrowing a book.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequestBody {
    pub book_id: Uuid,
    /// Days until the loan is due; 7 to 90, defaulting to 30.
    pub duration_days: Option<i64>,
}

/// Borrow a book. Decrements availability and opens an active loan.
#[utoipa::path(
    post,
    path = "/api/v1/loans",
    request_body = BorrowRequestBody,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown book", body = Error),
        (status = 409, description = "No copies available or already borrowed", body = Error)
    ),
    tags = ["loans"],
    operation_id = "borrowBook",
    security(("SessionCookie" = []))
)]
#[post("/loans")]
pub async fn borrow_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BorrowRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let body = payload.into_inner();
    let loan = state
        .loan_command
        .borrow(BorrowRequest {
            user_id,
            book_id: body.book_id,
            duration_days: body.duration_days,
        })
        .await?;
    Ok(HttpResponse::Created().json(loan))
}

/// Return a borrowed book. Borrowers may return their own loans;
/// administrators may return anyone's.
#[utoipa::path(
    post,
    path = "/api/v1/loans/{id}/return",
    params(("id" = String, Path, format = "uuid", description = "Loan identifier")),
    responses(
        (status = 200, description = "Loan closed", body = Loan),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the borrower", body = Error),
        (status = 404, description = "Unknown loan", body = Error),
        (status = 409, description = "Loan already returned", body = Error)
    ),
    tags = ["loans"],
    operation_id = "returnLoan",
    security(("SessionCookie" = []))
)]
#[post("/loans/{id}/return")]
pub async fn return_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Loan>> {
    let user_id = session.require_user_id()?;
    let loan_id = parse_uuid(&path, FieldName::new("id"))?;
    let is_admin = state.accounts.is_admin(user_id).await?;
    let loan = state
        .loan_command
        .return_loan(ReturnRequest {
            loan_id,
            user_id,
            is_admin,
        })
        .await?;
    Ok(web::Json(loan))
}

/// The session user's active loans.
#[utoipa::path(
    get,
    path = "/api/v1/loans",
    responses(
        (status = 200, description = "Active loans", body = [LoanWithBook]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["loans"],
    operation_id = "listActiveLoans",
    security(("SessionCookie" = []))
)]
#[get("/loans")]
pub async fn list_active_loans(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<LoanWithBook>>> {
    let user_id = session.require_user_id()?;
    let loans = state.loan_query.list_active(user_id).await?;
    Ok(web::Json(loans))
}

/// The session user's returned loans.
#[utoipa::path(
    get,
    path = "/api/v1/loans/history",
    responses(
        (status = 200, description = "Returned loans", body = [LoanWithBook]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["loans"],
    operation_id = "listLoanHistory",
    security(("SessionCookie" = []))
)]
#[get("/loans/history")]
pub async fn list_loan_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<LoanWithBook>>> {
    let user_id = session.require_user_id()?;
    let loans = state.loan_query.list_history(user_id).await?;
    Ok(web::Json(loans))
}

/// Every active loan with borrower details. Administrators only.
#[utoipa::path(
    get,
    path = "/api/v1/admin/loans",
    responses(
        (status = 200, description = "All active loans", body = [LoanWithBorrower]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["loans"],
    operation_id = "listAllActiveLoans",
    security(("SessionCookie" = []))
)]
#[get("/admin/loans")]
pub async fn list_all_active_loans(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<LoanWithBorrower>>> {
    state.require_admin(&session).await?;
    let loans = state.loan_query.list_all_active().await?;
    Ok(web::Json(loans))
}

#[cfg(test)]
#[path = "loans_tests.rs"]
mod tests;
