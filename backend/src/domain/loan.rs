//! Loan data model.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{BookSummary, DisplayName, UserId};

/// Shortest loan that can be requested, in days.
pub const LOAN_DURATION_MIN: i64 = 7;
/// Longest loan that can be requested, in days.
pub const LOAN_DURATION_MAX: i64 = 90;
/// Duration applied when the request omits one, in days.
pub const LOAN_DURATION_DEFAULT: i64 = 30;

/// Validation errors returned by loan constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanValidationError {
    DurationOutOfRange { min: i64, max: i64 },
}

impl fmt::Display for LoanValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DurationOutOfRange { min, max } => {
                write!(f, "loan duration must be between {min} and {max} days")
            }
        }
    }
}

impl std::error::Error for LoanValidationError {}

/// Loan duration in whole days, bounded to `[7, 90]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LoanDuration(i64);

impl LoanDuration {
    /// Validate and construct a [`LoanDuration`].
    pub fn new(days: i64) -> Result<Self, LoanValidationError> {
        if !(LOAN_DURATION_MIN..=LOAN_DURATION_MAX).contains(&days) {
            return Err(LoanValidationError::DurationOutOfRange {
                min: LOAN_DURATION_MIN,
                max: LOAN_DURATION_MAX,
            });
        }
        Ok(Self(days))
    }

    /// The default duration.
    pub fn default_duration() -> Self {
        Self(LOAN_DURATION_DEFAULT)
    }

    /// Duration in whole days.
    pub fn days(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for LoanDuration {
    type Error = LoanValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LoanDuration> for i64 {
    fn from(value: LoanDuration) -> Self {
        value.0
    }
}

/// Lifecycle state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// The copy is out with the borrower.
    Active,
    /// The copy has come back; terminal state.
    Returned,
}

impl LoanStatus {
    /// Stable string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Returned => "returned",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "returned" => Ok(Self::Returned),
            other => Err(format!("unknown loan status: {other}")),
        }
    }
}

/// A single borrowing of a book by a user.
///
/// Returning is irreversible; borrowing the same book again creates a new
/// loan rather than reviving this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    id: Uuid,
    #[schema(value_type = String, format = "uuid")]
    user_id: UserId,
    book_id: Uuid,
    start_date: NaiveDate,
    due_date: NaiveDate,
    status: LoanStatus,
}

impl Loan {
    /// Start a new active loan beginning on `start_date`.
    pub fn start(user_id: UserId, book_id: Uuid, start_date: NaiveDate, duration: LoanDuration) -> Self {
        // Duration is capped at 90 days, far below any NaiveDate overflow.
        let due_date = start_date
            .checked_add_days(Days::new(duration.days().unsigned_abs()))
            .unwrap_or(start_date);
        Self {
            id: Uuid::new_v4(),
            user_id,
            book_id,
            start_date,
            due_date,
            status: LoanStatus::Active,
        }
    }

    /// Rehydrate a loan from stored fields.
    pub fn from_parts(
        id: Uuid,
        user_id: UserId,
        book_id: Uuid,
        start_date: NaiveDate,
        due_date: NaiveDate,
        status: LoanStatus,
    ) -> Self {
        Self {
            id,
            user_id,
            book_id,
            start_date,
            due_date,
            status,
        }
    }

    /// Stable loan identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The borrower.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The borrowed book.
    pub fn book_id(&self) -> Uuid {
        self.book_id
    }

    /// Date the loan started.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Date the copy is due back.
    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Current lifecycle state.
    pub fn status(&self) -> LoanStatus {
        self.status
    }

    /// Whether the loan is still out.
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }
}

/// Kind of loan transition recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanEventKind {
    Created,
    Returned,
}

impl LoanEventKind {
    /// Stable string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Returned => "returned",
        }
    }
}

/// Append-only audit entry for a loan transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanEvent {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub kind: LoanEventKind,
    pub recorded_at: DateTime<Utc>,
}

/// Loan joined with a summary of the borrowed book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanWithBook {
    pub loan: Loan,
    pub book: BookSummary,
}

/// Active loan joined with the book and the borrower's display name.
///
/// Used by the administrative overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanWithBorrower {
    pub loan: Loan,
    pub book: BookSummary,
    #[schema(value_type = String)]
    pub borrower: DisplayName,
}
