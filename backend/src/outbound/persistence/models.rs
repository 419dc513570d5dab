//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{books, comments, inventory, loan_events, loans, stock_history, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub birth_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
    pub birth_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the books table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookRow {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
    pub description: Option<String>,
    pub category: String,
    pub cover_url: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new book records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = books)]
pub(crate) struct NewBookRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub author: &'a str,
    pub published_year: Option<i32>,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub cover_url: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Changeset struct for updating existing book records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = books)]
pub(crate) struct BookChangeset<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub published_year: Option<i32>,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub cover_url: &'a str,
}

/// Row struct for reading from the inventory table.
#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = inventory)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InventoryRow {
    pub book_id: Uuid,
    pub total: i32,
    pub available: i32,
}

/// Insertable struct for creating inventory records.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = inventory)]
pub(crate) struct NewInventoryRow {
    pub book_id: Uuid,
    pub total: i32,
    pub available: i32,
}

/// Insertable struct for stock audit entries.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = stock_history)]
pub(crate) struct NewStockHistoryRow<'a> {
    pub id: Uuid,
    pub book_id: Uuid,
    pub kind: &'a str,
    pub quantity: i32,
    pub admin_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

/// Row struct for reading from the loans table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = loans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
}

/// Insertable struct for creating loan records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = loans)]
pub(crate) struct NewLoanRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: &'a str,
}

/// Insertable struct for loan audit entries.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = loan_events)]
pub(crate) struct NewLoanEventRow<'a> {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub kind: &'a str,
    pub recorded_at: DateTime<Utc>,
}

/// Row struct for reading from the comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub rating: i16,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating comment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub rating: i16,
    pub content: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}
