//! Review domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use product_review_core::{ProductId, Rating, ReviewId};

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review ID.
    pub id: ReviewId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Reviewer display name.
    pub reviewer_name: String,
    /// Review text.
    pub comment: String,
    /// Star rating.
    pub rating: Rating,
    /// Number of users who marked the review helpful; never negative.
    pub helpful_count: i32,
    /// When the review was posted.
    pub created_at: DateTime<Utc>,
}
