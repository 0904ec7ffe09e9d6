//! Product domain types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use product_review_core::{Price, ProductId, RatingHistogram, RatingSummary};

/// A catalog product with its denormalized rating aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Category labels, unique and sorted.
    pub categories: BTreeSet<String>,
    /// Current price.
    pub price: Price,
    /// Image URL.
    pub image_url: String,
    /// Mean review rating rounded to one decimal.
    pub average_rating: f64,
    /// Number of reviews.
    pub review_count: i32,
}

impl Product {
    /// Overwrite the rating aggregate.
    pub fn apply_summary(&mut self, summary: RatingSummary) {
        self.average_rating = summary.average_rating;
        self.review_count = summary.review_count_i32();
    }
}

/// Product detail view: the product plus its rating histogram and AI summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    /// Review counts per star rating, 1 through 5.
    pub rating_breakdown: RatingHistogram,
    /// Generated review summary; absent when there are no reviews or the
    /// assistant is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

/// A product to insert (seeding and imports).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
}

/// Result of toggling a wishlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistToggle {
    pub product_id: ProductId,
    /// Whether the product is on the wishlist after the toggle.
    pub wishlisted: bool,
}
