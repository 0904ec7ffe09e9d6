//! Catalog persistence.
//!
//! # Backends
//!
//! - [`PgStore`] - `PostgreSQL` schema `catalog` (see `crates/server/migrations/`)
//! - [`MemoryStore`] - process-local, for development and tests
//!
//! Both backends route aggregate arithmetic, filter composition, and vote
//! transitions through `product_review_core`, so they return identical results
//! for identical inputs. [`Store`] dispatches to whichever one is configured.
//!
//! ## Tables
//!
//! - `product` - Products with denormalized `average_rating` / `review_count`
//! - `product_category` - Category labels per product
//! - `review` - Reviews (`helpful_count` may be NULL on legacy rows)
//! - `review_vote` - Helpful votes, primary key `(user_id, review_id)`
//! - `wishlist_item` - Wishlist membership, primary key `(user_id, product_id)`
//! - `notification` - Per-user notifications
//!
//! # Migrations
//!
//! ```bash
//! cargo run -p product-review-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use product_review_core::{
    CatalogFilter, CatalogStats, NotificationDraft, NotificationId, Page, PageRequest, ProductId,
    ProductSortField, Rating, RatingHistogram, RatingSummary, ReviewDraft, ReviewId,
    ReviewSortField, SortSpec, ToggleOutcome, UserId,
};

use crate::models::{NewProduct, Notification, Product, Review};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// The configured catalog store.
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Self::Postgres($store) => $call,
            Self::Memory($store) => $call,
        }
    };
}

impl Store {
    /// Short backend name for logs.
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Check the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database cannot be queried.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        dispatch!(self, s => s.ping().await)
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// List products matching a filter, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list_products(
        &self,
        filter: &CatalogFilter,
        page: PageRequest,
        sort: SortSpec<ProductSortField>,
    ) -> Result<Page<Product>, RepositoryError> {
        dispatch!(self, s => s.list_products(filter, page, sort).await)
    }

    /// Product, review, and rating totals for a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn catalog_stats(&self, filter: &CatalogFilter) -> Result<CatalogStats, RepositoryError> {
        dispatch!(self, s => s.catalog_stats(filter).await)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        dispatch!(self, s => s.get_product(id).await)
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn count_products(&self) -> Result<u64, RepositoryError> {
        dispatch!(self, s => s.count_products().await)
    }

    /// Insert a product with an empty rating aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    pub async fn insert_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        dispatch!(self, s => s.insert_product(product).await)
    }

    /// Remove every product, review, vote, wishlist entry, and notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        dispatch!(self, s => s.clear().await)
    }

    // -------------------------------------------------------------------------
    // Reviews and stats
    // -------------------------------------------------------------------------

    /// Review counts per star rating for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn rating_histogram(&self, id: ProductId) -> Result<RatingHistogram, RepositoryError> {
        dispatch!(self, s => s.rating_histogram(id).await)
    }

    /// List a product's reviews, optionally only those with one rating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn list_reviews(
        &self,
        product_id: ProductId,
        rating: Option<Rating>,
        page: PageRequest,
        sort: SortSpec<ReviewSortField>,
    ) -> Result<Page<Review>, RepositoryError> {
        dispatch!(self, s => s.list_reviews(product_id, rating, page, sort).await)
    }

    /// The newest reviews of a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn recent_reviews(
        &self,
        product_id: ProductId,
        limit: u32,
    ) -> Result<Vec<Review>, RepositoryError> {
        dispatch!(self, s => s.recent_reviews(product_id, limit).await)
    }

    /// Insert a review and recompute its product's rating aggregate in the
    /// same unit of work.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn add_review(&self, draft: &ReviewDraft) -> Result<Review, RepositoryError> {
        dispatch!(self, s => s.add_review(draft).await)
    }

    /// Recompute one product's rating aggregate from its reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn recompute_product_stats(
        &self,
        id: ProductId,
    ) -> Result<RatingSummary, RepositoryError> {
        dispatch!(self, s => s.recompute_product_stats(id).await)
    }

    /// Recompute the rating aggregate of every product.
    ///
    /// Returns the number of products reconciled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any product fails to reconcile.
    pub async fn reconcile_all(&self) -> Result<u64, RepositoryError> {
        let ids = dispatch!(self, s => s.product_ids().await)?;
        let mut reconciled = 0;
        for id in ids {
            match self.recompute_product_stats(id).await {
                Ok(_) => reconciled += 1,
                // Deleted between listing and locking.
                Err(RepositoryError::NotFound) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(reconciled)
    }

    // -------------------------------------------------------------------------
    // Helpful votes
    // -------------------------------------------------------------------------

    /// Toggle a helpful vote and return the updated review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn toggle_helpful(
        &self,
        review_id: ReviewId,
        user: Option<&UserId>,
    ) -> Result<(Review, ToggleOutcome), RepositoryError> {
        dispatch!(self, s => s.toggle_helpful(review_id, user).await)
    }

    /// Review IDs the user currently has a helpful vote on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn voted_review_ids(&self, user: &UserId) -> Result<Vec<ReviewId>, RepositoryError> {
        dispatch!(self, s => s.voted_review_ids(user).await)
    }

    // -------------------------------------------------------------------------
    // Wishlist
    // -------------------------------------------------------------------------

    /// Add the product to the user's wishlist, or remove it if present.
    ///
    /// Returns whether the product is wishlisted afterwards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn toggle_wishlist(
        &self,
        user: &UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        dispatch!(self, s => s.toggle_wishlist(user, product_id).await)
    }

    /// Wishlisted product IDs in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn wishlist(&self, user: &UserId) -> Result<Vec<ProductId>, RepositoryError> {
        dispatch!(self, s => s.wishlist(user).await)
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    /// Create an unread notification for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    pub async fn create_notification(
        &self,
        user: &UserId,
        draft: &NotificationDraft,
    ) -> Result<Notification, RepositoryError> {
        dispatch!(self, s => s.create_notification(user, draft).await)
    }

    /// A user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn notifications(&self, user: &UserId) -> Result<Vec<Notification>, RepositoryError> {
        dispatch!(self, s => s.notifications(user).await)
    }

    /// Number of unread notifications for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn unread_count(&self, user: &UserId) -> Result<u64, RepositoryError> {
        dispatch!(self, s => s.unread_count(user).await)
    }

    /// Mark one of the user's notifications read. Missing IDs are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the update fails.
    pub async fn mark_notification_read(
        &self,
        user: &UserId,
        id: NotificationId,
    ) -> Result<(), RepositoryError> {
        dispatch!(self, s => s.mark_notification_read(user, id).await)
    }

    /// Mark all of a user's notifications read. Returns the number changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the update fails.
    pub async fn mark_all_notifications_read(&self, user: &UserId) -> Result<u64, RepositoryError> {
        dispatch!(self, s => s.mark_all_notifications_read(user).await)
    }

    /// Delete one of the user's notifications. Missing IDs are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    pub async fn delete_notification(
        &self,
        user: &UserId,
        id: NotificationId,
    ) -> Result<(), RepositoryError> {
        dispatch!(self, s => s.delete_notification(user, id).await)
    }

    /// Delete all of a user's notifications. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    pub async fn delete_all_notifications(&self, user: &UserId) -> Result<u64, RepositoryError> {
        dispatch!(self, s => s.delete_all_notifications(user).await)
    }
}
