//! Rating aggregation.
//!
//! Summaries are recomputed from the comment ratings on every read; there is
//! no cache to invalidate when a comment lands.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregated rating for a book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Flat mean of the ratings, rounded to one decimal place.
    pub average: f64,
    /// Number of ratings contributing to the mean.
    pub count: u64,
}

impl RatingSummary {
    /// Summary for a book with no ratings.
    pub fn empty() -> Self {
        Self {
            average: 0.0,
            count: 0,
        }
    }

    /// Compute the summary over the given ratings.
    pub fn from_ratings(ratings: &[i16]) -> Self {
        if ratings.is_empty() {
            return Self::empty();
        }
        let sum: i64 = ratings.iter().map(|rating| i64::from(*rating)).sum();
        #[expect(
            clippy::cast_precision_loss,
            reason = "rating sums stay far below f64's integer range"
        )]
        let mean = sum as f64 / ratings.len() as f64;
        Self {
            average: (mean * 10.0).round() / 10.0,
            count: ratings.len() as u64,
        }
    }
}
