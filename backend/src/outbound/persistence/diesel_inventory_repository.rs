//! PostgreSQL-backed `InventoryRepository` implementation using Diesel ORM.
//!
//! Availability moves through single conditional UPDATE statements so the
//! `0 <= available <= total` invariant is enforced by the database under
//! concurrency, never by a read-then-write sequence in Rust.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{InventoryRepository, InventoryRepositoryError};
use crate::domain::{InventoryRecord, StockChangeKind, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{InventoryRow, NewInventoryRow, NewStockHistoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{inventory, stock_history};

/// Diesel-backed implementation of the inventory repository port.
#[derive(Clone)]
pub struct DieselInventoryRepository {
    pool: DbPool,
}

impl DieselInventoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> InventoryRepositoryError {
    map_pool_error(error, InventoryRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error, book_id: Uuid) -> InventoryRepositoryError {
    map_diesel_error(
        error,
        InventoryRepositoryError::query,
        InventoryRepositoryError::connection,
        || InventoryRepositoryError::DuplicateRecord { book_id },
    )
}

fn row_to_record(row: InventoryRow) -> Result<InventoryRecord, InventoryRepositoryError> {
    InventoryRecord::new(row.book_id, row.total, row.available)
        .map_err(|err| InventoryRepositoryError::query(err.to_string()))
}

#[async_trait]
impl InventoryRepository for DieselInventoryRepository {
    async fn initialize(
        &self,
        book_id: Uuid,
        total: i32,
    ) -> Result<(), InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::insert_into(inventory::table)
            .values(&NewInventoryRow {
                book_id,
                total,
                available: total,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_diesel(error, book_id))
    }

    async fn adjust(
        &self,
        book_id: Uuid,
        delta: i32,
    ) -> Result<InventoryRecord, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        // Conditional update: only rows where the shifted availability stays
        // within [0, total] are touched, so a losing race simply matches
        // zero rows.
        let updated: Option<InventoryRow> = diesel::update(
            inventory::table
                .find(book_id)
                .filter((inventory::available + delta).ge(0))
                .filter((inventory::available + delta).le(inventory::total)),
        )
        .set(inventory::available.eq(inventory::available + delta))
        .returning(InventoryRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(|error| map_diesel(error, book_id))?;

        if let Some(row) = updated {
            return row_to_record(row);
        }

        // Distinguish a missing ledger record from a bounds refusal.
        let current: Option<InventoryRow> = inventory::table
            .find(book_id)
            .select(InventoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|error| map_diesel(error, book_id))?;

        match current {
            None => Err(InventoryRepositoryError::NotFound { book_id }),
            Some(_) if delta < 0 => Err(InventoryRepositoryError::InsufficientStock { book_id }),
            Some(_) => Err(InventoryRepositoryError::CapacityExceeded { book_id }),
        }
    }

    async fn set_levels(
        &self,
        book_id: Uuid,
        total: i32,
        available: i32,
        admin_id: &UserId,
    ) -> Result<InventoryRecord, InventoryRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let audit_row = NewStockHistoryRow {
            id: Uuid::new_v4(),
            book_id,
            kind: StockChangeKind::CapacityEdit.as_str(),
            quantity: total,
            admin_id: *admin_id.as_uuid(),
            recorded_at: chrono::Utc::now(),
        };

        // Override and audit entry commit together or not at all.
        let row: Option<InventoryRow> = conn
            .transaction(|conn| {
                async move {
                    let row: Option<InventoryRow> =
                        diesel::update(inventory::table.find(book_id))
                            .set((
                                inventory::total.eq(total),
                                inventory::available.eq(available),
                            ))
                            .returning(InventoryRow::as_returning())
                            .get_result(conn)
                            .await
                            .optional()?;

                    if row.is_some() {
                        diesel::insert_into(stock_history::table)
                            .values(&audit_row)
                            .execute(conn)
                            .await?;
                    }

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|error| map_diesel(error, book_id))?;

        row.map_or(
            Err(InventoryRepositoryError::NotFound { book_id }),
            row_to_record,
        )
    }

    async fn get(
        &self,
        book_id: Uuid,
    ) -> Result<Option<InventoryRecord>, InventoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<InventoryRow> = inventory::table
            .find(book_id)
            .select(InventoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|error| map_diesel(error, book_id))?;

        row.map(row_to_record).transpose()
    }
}
