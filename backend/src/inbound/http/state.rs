//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    Accounts, CatalogCommand, CatalogQuery, CommentCommand, CommentQuery, LoanCommand, LoanQuery,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub catalog_query: Arc<dyn CatalogQuery>,
    pub catalog_command: Arc<dyn CatalogCommand>,
    pub loan_command: Arc<dyn LoanCommand>,
    pub loan_query: Arc<dyn LoanQuery>,
    pub comment_command: Arc<dyn CommentCommand>,
    pub comment_query: Arc<dyn CommentQuery>,
    pub accounts: Arc<dyn Accounts>,
}

impl HttpState {
    /// Resolve the session to an authenticated administrator.
    ///
    /// Returns `401 Unauthorized` without a session and `403 Forbidden` for a
    /// non-admin account.
    pub async fn require_admin(&self, session: &SessionContext) -> Result<UserId, Error> {
        let user_id = session.require_user_id()?;
        if !self.accounts.is_admin(user_id).await? {
            return Err(Error::forbidden("administrator rights required"));
        }
        Ok(user_id)
    }
}
