//! Inventory ledger data model.
//!
//! Each book has exactly one inventory record tracking how many copies exist
//! and how many are currently available for loan.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::UserId;

/// Copies registered when a book is created without an explicit count.
pub const DEFAULT_TOTAL_COPIES: i32 = 50;

/// Validation errors returned by [`InventoryRecord::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryValidationError {
    NegativeTotal,
    NegativeAvailable,
    AvailableExceedsTotal { total: i32, available: i32 },
}

impl fmt::Display for InventoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeTotal => write!(f, "total copies must not be negative"),
            Self::NegativeAvailable => write!(f, "available copies must not be negative"),
            Self::AvailableExceedsTotal { total, available } => write!(
                f,
                "available copies ({available}) must not exceed total copies ({total})"
            ),
        }
    }
}

impl std::error::Error for InventoryValidationError {}

/// Per-book copy counts.
///
/// ## Invariants
/// - `0 <= available <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    book_id: Uuid,
    total: i32,
    available: i32,
}

impl InventoryRecord {
    /// Build a validated [`InventoryRecord`].
    pub fn new(book_id: Uuid, total: i32, available: i32) -> Result<Self, InventoryValidationError> {
        if total < 0 {
            return Err(InventoryValidationError::NegativeTotal);
        }
        if available < 0 {
            return Err(InventoryValidationError::NegativeAvailable);
        }
        if available > total {
            return Err(InventoryValidationError::AvailableExceedsTotal { total, available });
        }
        Ok(Self {
            book_id,
            total,
            available,
        })
    }

    /// Identifier of the book this record belongs to.
    pub fn book_id(&self) -> Uuid {
        self.book_id
    }

    /// Total registered copies.
    pub fn total(&self) -> i32 {
        self.total
    }

    /// Copies currently available for loan.
    pub fn available(&self) -> i32 {
        self.available
    }
}

/// Kind of administrative stock change recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockChangeKind {
    /// An administrator edited the copy counts directly.
    CapacityEdit,
}

impl StockChangeKind {
    /// Stable string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CapacityEdit => "capacity_edit",
        }
    }
}

impl std::str::FromStr for StockChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capacity_edit" => Ok(Self::CapacityEdit),
            other => Err(format!("unknown stock change kind: {other}")),
        }
    }
}

/// Append-only audit entry for an administrative stock change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub id: Uuid,
    pub book_id: Uuid,
    pub kind: StockChangeKind,
    pub quantity: i32,
    #[schema(value_type = String, format = "uuid")]
    pub admin_id: UserId,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(50, 50)]
    #[case(50, 0)]
    #[case(0, 0)]
    fn valid_counts_are_accepted(#[case] total: i32, #[case] available: i32) {
        let record =
            InventoryRecord::new(Uuid::new_v4(), total, available).expect("valid record");
        assert_eq!(record.total(), total);
        assert_eq!(record.available(), available);
    }

    #[rstest]
    fn available_above_total_is_rejected() {
        let err = InventoryRecord::new(Uuid::new_v4(), 10, 12).expect_err("invalid record");
        assert_eq!(
            err,
            InventoryValidationError::AvailableExceedsTotal {
                total: 10,
                available: 12
            }
        );
    }

    #[rstest]
    #[case(-1, 0, InventoryValidationError::NegativeTotal)]
    #[case(10, -1, InventoryValidationError::NegativeAvailable)]
    fn negative_counts_are_rejected(
        #[case] total: i32,
        #[case] available: i32,
        #[case] expected: InventoryValidationError,
    ) {
        assert_eq!(InventoryRecord::new(Uuid::new_v4(), total, available), Err(expected));
    }

    #[rstest]
    fn stock_change_kind_round_trips() {
        let kind: StockChangeKind = StockChangeKind::CapacityEdit.as_str().parse().expect("parse");
        assert_eq!(kind, StockChangeKind::CapacityEdit);
    }
}
