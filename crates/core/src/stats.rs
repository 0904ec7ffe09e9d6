//! Rating aggregation.
//!
//! Products carry a denormalized `averageRating` and `reviewCount`. Both are
//! derived values: whenever a product's review set changes, the store rereads
//! the ratings and writes back the result of [`RatingSummary::from_ratings`]
//! in the same transaction. Nothing here is computed lazily on read, so
//! listing and sorting by rating stay cheap.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Rating;

/// Round to one decimal place, half away from zero.
///
/// Ratings are positive, so this matches `round(avg * 10) / 10` with
/// half-up rounding: `4.25 -> 4.3`, `3.333 -> 3.3`.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregate over a set of ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Number of reviews.
    pub review_count: u64,
    /// Mean rating rounded to one decimal place; `0.0` when there are no reviews.
    pub average_rating: f64,
}

impl RatingSummary {
    /// Summary of an empty review set.
    pub const EMPTY: Self = Self {
        review_count: 0,
        average_rating: 0.0,
    };

    /// Compute the summary for a set of ratings.
    #[must_use]
    pub fn from_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        let (count, sum) = ratings
            .into_iter()
            .fold((0_u64, 0_u64), |(count, sum), rating| {
                (count + 1, sum + u64::from(rating.get()))
            });
        Self::from_totals(count, sum)
    }

    /// Compute the summary from a review count and the sum of their ratings.
    ///
    /// Used when the store aggregates in SQL (`COUNT(*)`, `SUM(rating)`).
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Review counts never approach 2^52
    pub fn from_totals(review_count: u64, rating_sum: u64) -> Self {
        if review_count == 0 {
            return Self::EMPTY;
        }
        let mean = rating_sum as f64 / review_count as f64;
        Self {
            review_count,
            average_rating: round_to_tenth(mean),
        }
    }

    /// Review count as the `INTEGER` stored on the product row.
    #[must_use]
    pub fn review_count_i32(&self) -> i32 {
        i32::try_from(self.review_count).unwrap_or(i32::MAX)
    }
}

impl Default for RatingSummary {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Fixed five-bucket histogram of review ratings.
///
/// Every bucket from 1 to 5 is always present, defaulting to zero. Serializes
/// as a JSON object keyed by rating: `{"1":1,"2":0,"3":1,"4":0,"5":2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingHistogram(BTreeMap<u8, u64>);

impl RatingHistogram {
    /// Histogram with every bucket at zero.
    #[must_use]
    pub fn empty() -> Self {
        Self(Rating::all().map(|r| (r.get(), 0)).collect())
    }

    /// Build a histogram from grouped `(rating, count)` rows.
    ///
    /// Buckets missing from the input stay at zero. Repeated ratings add up.
    #[must_use]
    pub fn from_counts(counts: impl IntoIterator<Item = (Rating, u64)>) -> Self {
        let mut histogram = Self::empty();
        for (rating, count) in counts {
            *histogram.0.entry(rating.get()).or_insert(0) += count;
        }
        histogram
    }

    /// Build a histogram by counting individual ratings.
    #[must_use]
    pub fn from_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        Self::from_counts(ratings.into_iter().map(|r| (r, 1)))
    }

    /// Count for a single rating bucket.
    #[must_use]
    pub fn count(&self, rating: Rating) -> u64 {
        self.0.get(&rating.get()).copied().unwrap_or(0)
    }

    /// Total number of reviews across all buckets.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

impl Default for RatingHistogram {
    fn default() -> Self {
        Self::empty()
    }
}

/// Catalog-wide metrics for a filtered product set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    /// Products matching the filter.
    pub total_products: u64,
    /// Reviews across the matching products.
    pub total_reviews: u64,
    /// Review-weighted mean rating across the matching products.
    pub average_rating: f64,
}

impl CatalogStats {
    /// Combine a product count with the rating summary of their reviews.
    #[must_use]
    pub const fn new(total_products: u64, reviews: RatingSummary) -> Self {
        Self {
            total_products,
            total_reviews: reviews.review_count,
            average_rating: reviews.average_rating,
        }
    }
}
