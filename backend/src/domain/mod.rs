//! Domain model for the library catalogue.
//!
//! Entities validate their own invariants at construction; ports describe the
//! boundaries to persistence and hashing; services implement the driving
//! ports the HTTP layer consumes.

mod account_service;
mod book;
mod catalog_service;
mod comment;
mod comment_service;
mod error;
mod inventory;
mod loan;
mod loan_service;
pub mod ports;
mod rating;
pub mod seed;
mod trace_id;
mod user;

pub use account_service::{AccountService, PASSWORD_MIN};
pub use book::{
    Book, BookDraft, BookSummary, BookValidationError, DEFAULT_CATEGORY, DEFAULT_COVER_URL,
};
pub use catalog_service::{CatalogService, FEATURED_BOOK_COUNT};
pub use comment::{
    COMMENT_CONTENT_MIN, Comment, CommentContent, CommentValidationError, CommentWithAuthor,
    Rating,
};
pub use comment_service::CommentService;
pub use error::{Error, ErrorCode, ErrorValidationError};
pub use inventory::{
    DEFAULT_TOTAL_COPIES, InventoryRecord, InventoryValidationError, StockChange, StockChangeKind,
};
pub use loan::{
    LOAN_DURATION_DEFAULT, LOAN_DURATION_MAX, LOAN_DURATION_MIN, Loan, LoanDuration, LoanEvent,
    LoanEventKind, LoanStatus, LoanValidationError, LoanWithBook, LoanWithBorrower,
};
pub use loan_service::LoanService;
pub use rating::RatingSummary;
pub use trace_id::{TRACE_ID_HEADER, TraceId};
pub use user::{
    DISPLAY_NAME_MAX, DISPLAY_NAME_MIN, DisplayName, EmailAddress, User, UserDraft, UserId,
    UserValidationError,
};
