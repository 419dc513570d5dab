//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! The unique index on `email` is the single arbiter of the
//! one-account-per-email rule; a concurrent second registration surfaces as
//! a unique violation rather than being caught by a prior lookup.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoredUser, UserRepository, UserRepositoryError};
use crate::domain::{User, UserDraft, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
        || UserRepositoryError::DuplicateEmail,
    )
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    User::new(UserDraft {
        id: UserId::from_uuid(row.id),
        display_name: row.display_name,
        email: row.email,
        is_admin: row.is_admin,
        birth_date: row.birth_date,
        created_at: row.created_at,
    })
    .map_err(|err| UserRepositoryError::query(err.to_string()))
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserRepositoryError> {
    rows.into_iter().map(row_to_user).collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<(), UserRepositoryError> {
        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            display_name: user.display_name().as_ref(),
            email: user.email().as_ref(),
            password_hash,
            is_admin: user.is_admin(),
            birth_date: user.birth_date(),
            created_at: user.created_at(),
        };

        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredUser>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(|row| {
            let password_hash = row.password_hash.clone();
            Ok(StoredUser {
                user: row_to_user(row)?,
                password_hash,
            })
        })
        .transpose()
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<UserRow> = users::table
            .find(user_id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<UserRow> = users::table
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows_to_users(rows)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::{NaiveDate, Utc};
    use diesel::result::DatabaseErrorKind;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn valid_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            display_name: "Grace Hopper".to_owned(),
            email: "grace@example.org".to_owned(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_owned(),
            is_admin: false,
            birth_date: NaiveDate::from_ymd_opt(1906, 12, 9).expect("valid date"),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn row_conversion_preserves_fields(valid_row: UserRow) {
        let user = row_to_user(valid_row).expect("valid row");
        assert_eq!(user.display_name().as_ref(), "Grace Hopper");
        assert_eq!(user.email().as_ref(), "grace@example.org");
        assert!(!user.is_admin());
    }

    #[rstest]
    fn row_conversion_rejects_malformed_emails(mut valid_row: UserRow) {
        valid_row.email = "not-an-email".to_owned();
        let err = row_to_user(valid_row).expect_err("malformed email should fail");
        assert!(matches!(err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn unique_violation_maps_to_duplicate_email() {
        let error = diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );
        assert_eq!(map_diesel(error), UserRepositoryError::DuplicateEmail);
    }

    #[rstest]
    fn pool_errors_map_to_connection() {
        let err = map_pool(PoolError::checkout("connection refused"));
        assert!(matches!(err, UserRepositoryError::Connection { .. }));
    }
}
