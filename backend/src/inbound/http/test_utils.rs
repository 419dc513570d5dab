//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, Resource, test, web};

use crate::domain::UserId;
use crate::domain::ports::{
    Accounts, CatalogCommand, CatalogQuery, CommentCommand, CommentQuery, LoanCommand, LoanQuery,
    MockAccounts, MockCatalogCommand, MockCatalogQuery, MockCommentCommand, MockCommentQuery,
    MockLoanCommand, MockLoanQuery,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Route that stores the given user id in the session.
///
/// Handler tests mount this alongside the handler under test so they can mint
/// a valid session cookie without exercising the login flow.
pub fn test_login_route() -> Resource {
    web::resource("/test-login/{user_id}").route(web::get().to(
        |session: SessionContext, path: web::Path<String>| async move {
            let user_id = UserId::new(path.as_str()).expect("valid test user id");
            session.persist_user(&user_id).expect("persist test user");
            HttpResponse::Ok().finish()
        },
    ))
}

/// Log `user_id` in through [`test_login_route`] and return the session cookie.
pub async fn login_as<S, B>(app: &S, user_id: UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!("/test-login/{user_id}"))
            .to_request(),
    )
    .await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Builder assembling an [`HttpState`] from mocks, defaulting every port to an
/// expectation-free mock so tests only configure what they exercise.
#[derive(Default)]
pub struct TestState {
    pub catalog_query: Option<MockCatalogQuery>,
    pub catalog_command: Option<MockCatalogCommand>,
    pub loan_command: Option<MockLoanCommand>,
    pub loan_query: Option<MockLoanQuery>,
    pub comment_command: Option<MockCommentCommand>,
    pub comment_query: Option<MockCommentQuery>,
    pub accounts: Option<MockAccounts>,
}

impl TestState {
    pub fn build(self) -> HttpState {
        HttpState {
            catalog_query: Arc::new(self.catalog_query.unwrap_or_default())
                as Arc<dyn CatalogQuery>,
            catalog_command: Arc::new(self.catalog_command.unwrap_or_default())
                as Arc<dyn CatalogCommand>,
            loan_command: Arc::new(self.loan_command.unwrap_or_default()) as Arc<dyn LoanCommand>,
            loan_query: Arc::new(self.loan_query.unwrap_or_default()) as Arc<dyn LoanQuery>,
            comment_command: Arc::new(self.comment_command.unwrap_or_default())
                as Arc<dyn CommentCommand>,
            comment_query: Arc::new(self.comment_query.unwrap_or_default())
                as Arc<dyn CommentQuery>,
            accounts: Arc::new(self.accounts.unwrap_or_default()) as Arc<dyn Accounts>,
        }
    }
}
