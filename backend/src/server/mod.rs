//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    FixtureCatalogRepository, FixtureCommentRepository, FixtureInventoryRepository,
    FixtureLoanRepository, FixturePasswordHasher, FixtureUserRepository,
};
use crate::domain::{AccountService, CatalogService, CommentService, LoanService};
use crate::inbound::http::books::{
    create_book, delete_book, featured_books, get_book, list_books, list_categories, search_books,
    set_stock, update_book,
};
use crate::inbound::http::comments::{add_comment, list_comments};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::loans::{
    borrow_book, list_active_loans, list_all_active_loans, list_loan_history, return_loan,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{current_user, list_users, login, logout, register};
use crate::middleware::Trace;
use crate::outbound::BcryptPasswordHasher;
use crate::outbound::persistence::{
    DbPool, DieselCatalogRepository, DieselCommentRepository, DieselInventoryRepository,
    DieselLoanRepository, DieselUserRepository,
};

/// Wire the HTTP state over database-backed repositories.
fn database_http_state(pool: &DbPool) -> HttpState {
    let catalog_repo = Arc::new(DieselCatalogRepository::new(pool.clone()));
    let inventory_repo = Arc::new(DieselInventoryRepository::new(pool.clone()));
    let loan_repo = Arc::new(DieselLoanRepository::new(pool.clone()));
    let comment_repo = Arc::new(DieselCommentRepository::new(pool.clone()));
    let user_repo = Arc::new(DieselUserRepository::new(pool.clone()));
    let hasher = Arc::new(BcryptPasswordHasher);

    let catalog = Arc::new(CatalogService::new(
        catalog_repo.clone(),
        inventory_repo,
        comment_repo.clone(),
    ));
    let loans = Arc::new(LoanService::new(loan_repo, catalog_repo.clone()));
    let comments = Arc::new(CommentService::new(comment_repo, catalog_repo));
    let accounts = Arc::new(AccountService::new(user_repo, hasher));

    HttpState {
        catalog_query: catalog.clone(),
        catalog_command: catalog,
        loan_command: loans.clone(),
        loan_query: loans,
        comment_command: comments.clone(),
        comment_query: comments,
        accounts,
    }
}

/// Wire the HTTP state over fixture repositories; only useful for smoke tests.
fn fixture_http_state() -> HttpState {
    let catalog_repo = Arc::new(FixtureCatalogRepository);
    let inventory_repo = Arc::new(FixtureInventoryRepository);
    let loan_repo = Arc::new(FixtureLoanRepository);
    let comment_repo = Arc::new(FixtureCommentRepository);
    let user_repo = Arc::new(FixtureUserRepository);
    let hasher = Arc::new(FixturePasswordHasher);

    let catalog = Arc::new(CatalogService::new(
        catalog_repo.clone(),
        inventory_repo,
        comment_repo.clone(),
    ));
    let loans = Arc::new(LoanService::new(loan_repo, catalog_repo.clone()));
    let comments = Arc::new(CommentService::new(comment_repo, catalog_repo));
    let accounts = Arc::new(AccountService::new(user_repo, hasher));

    HttpState {
        catalog_query: catalog.clone(),
        catalog_command: catalog,
        loan_command: loans.clone(),
        loan_query: loans,
        comment_command: comments.clone(),
        comment_query: comments,
        accounts,
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
    session_ttl_hours: i64,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
        session_ttl_hours,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::hours(session_ttl_hours)),
        )
        .build();

    // Fixed-path routes go before their `{id}` siblings so "featured" is
    // never parsed as a book id.
    let api = web::scope("/api/v1")
        .wrap(session)
        .service(register)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(list_users)
        .service(list_books)
        .service(featured_books)
        .service(list_categories)
        .service(search_books)
        .service(create_book)
        .service(list_comments)
        .service(add_comment)
        .service(get_book)
        .service(update_book)
        .service(delete_book)
        .service(set_stock)
        .service(borrow_book)
        .service(list_active_loans)
        .service(list_loan_history)
        .service(return_loan)
        .service(list_all_active_loans);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = match &config.db_pool {
        Some(pool) => web::Data::new(database_http_state(pool)),
        None => web::Data::new(fixture_http_state()),
    };
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        session_ttl_hours,
        bind_addr,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
            session_ttl_hours,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
