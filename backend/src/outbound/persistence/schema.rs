//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation; regenerate with `diesel print-schema` after migrating.

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Human-readable display name.
        display_name -> Varchar,
        /// Lower-cased email address, unique.
        email -> Varchar,
        /// Bcrypt password hash.
        password_hash -> Varchar,
        /// Whether the account holds administrative rights.
        is_admin -> Bool,
        /// Date of birth.
        birth_date -> Date,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogued books.
    books (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        title -> Varchar,
        author -> Varchar,
        published_year -> Nullable<Int4>,
        description -> Nullable<Text>,
        category -> Varchar,
        cover_url -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-book copy counts; one row per book.
    ///
    /// A CHECK constraint keeps `0 <= available <= total`.
    inventory (book_id) {
        /// Primary key and foreign key to `books`.
        book_id -> Uuid,
        total -> Int4,
        available -> Int4,
    }
}

diesel::table! {
    /// Append-only audit trail of administrative stock changes.
    stock_history (id) {
        id -> Uuid,
        book_id -> Uuid,
        kind -> Varchar,
        quantity -> Int4,
        admin_id -> Uuid,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Book loans.
    ///
    /// A partial unique index on `(user_id, book_id)` where
    /// `status = 'active'` enforces one active loan per user and book.
    loans (id) {
        id -> Uuid,
        user_id -> Uuid,
        book_id -> Uuid,
        start_date -> Date,
        due_date -> Date,
        status -> Varchar,
    }
}

diesel::table! {
    /// Append-only audit trail of loan transitions.
    loan_events (id) {
        id -> Uuid,
        loan_id -> Uuid,
        kind -> Varchar,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ratings and reviews; unique per `(user_id, book_id)`.
    comments (id) {
        id -> Uuid,
        user_id -> Uuid,
        book_id -> Uuid,
        rating -> Int2,
        content -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(inventory -> books (book_id));
diesel::joinable!(stock_history -> books (book_id));
diesel::joinable!(stock_history -> users (admin_id));
diesel::joinable!(loans -> books (book_id));
diesel::joinable!(loans -> users (user_id));
diesel::joinable!(loan_events -> loans (loan_id));
diesel::joinable!(comments -> books (book_id));
diesel::joinable!(comments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    books,
    inventory,
    stock_history,
    loans,
    loan_events,
    comments,
);
