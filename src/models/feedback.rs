// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feedback left by one swap party about the other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Feedback record. Append-only; at most one per (swap, rater).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: String,
    pub swap_id: String,
    pub rater_id: String,
    pub rated_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate rating shown on profile and search cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Arithmetic mean, `None` when the user has no feedback yet
    pub average: Option<f64>,
    pub count: u32,
}

impl RatingSummary {
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0i64, 0u32), |(sum, count), r| (sum + r, count + 1));

        let average = (count > 0).then(|| sum as f64 / f64::from(count));
        Self { average, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary_has_no_average() {
        let summary = RatingSummary::from_ratings(Vec::new());
        assert_eq!(summary.average, None);
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn test_summary_is_arithmetic_mean() {
        let summary = RatingSummary::from_ratings([5, 4, 3]);
        assert_eq!(summary.average, Some(4.0));
        assert_eq!(summary.count, 3);
    }
}
