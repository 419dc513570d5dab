//! Account HTTP handlers.
//!
//! ```text
//! POST /api/v1/register
//! POST /api/v1/login
//! POST /api/v1/logout
//! GET  /api/v1/me
//! GET  /api/v1/admin/users
//! ```
//!
//! Registration and login both establish a session cookie.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{LoginRequest, RegisterRequest};
use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_iso_date};

/// Request payload for registering an account.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    pub display_name: String,
    pub email: String,
    pub password: String,
    /// ISO 8601 date, `YYYY-MM-DD`.
    pub birth_date: String,
}

/// Request payload for logging in.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    pub email: String,
    pub password: String,
}

/// Register an account and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequestBody,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequestBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let birth_date = parse_iso_date(&body.birth_date, FieldName::new("birthDate"))?;
    let user = state
        .accounts
        .register(RegisterRequest {
            display_name: body.display_name,
            email: body.email,
            password: body.password,
            birth_date,
        })
        .await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Created().json(user))
}

/// Verify credentials and start a session.
///
/// Unknown emails and wrong passwords fail with the same message so the
/// endpoint does not leak which accounts exist.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequestBody,
    responses(
        (status = 200, description = "Logged in", body = User),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequestBody>,
) -> ApiResult<web::Json<User>> {
    let body = payload.into_inner();
    let user = state
        .accounts
        .login(LoginRequest {
            email: body.email,
            password: body.password,
        })
        .await?;
    session.persist_user(user.id())?;
    Ok(web::Json(user))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session ended")),
    tags = ["users"],
    operation_id = "logout",
    security(("SessionCookie" = []))
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The logged-in user's account.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current account", body = User),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user_id = session.require_user_id()?;
    let user = state.accounts.get_user(user_id).await?;
    Ok(web::Json(user))
}

/// Every registered account. Administrators only.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "All accounts", body = [User]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("SessionCookie" = []))
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    state.require_admin(&session).await?;
    let users = state.accounts.list_users().await?;
    Ok(web::Json(users))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
