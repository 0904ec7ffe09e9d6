//! Catalog service: products, reviews, helpful votes, and the assistant.

use tracing::{debug, info, instrument, warn};

use product_review_core::{
    CatalogFilter, CatalogStats, Page, PageRequest, ProductId, ProductSortField, Rating,
    ReviewDraft, ReviewId, ReviewInput, ReviewSortField, SortSpec, UserId, chat_question,
};

use crate::assistant::{Assistant, MAX_PROMPT_REVIEWS};
use crate::db::Store;
use crate::error::{AppError, NotFoundExt, Result};
use crate::models::{Product, ProductDetail, Review};

/// Catalog service.
///
/// Read paths never touch the rating aggregate; only [`Self::add_review`]
/// changes it, through the store's reconciler.
pub struct CatalogService<'a> {
    store: &'a Store,
    assistant: Option<&'a Assistant>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: &'a Store, assistant: Option<&'a Assistant>) -> Self {
        Self { store, assistant }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    #[instrument(skip(self), fields(sort = %sort))]
    pub async fn list_products(
        &self,
        filter: &CatalogFilter,
        page: PageRequest,
        sort: SortSpec<ProductSortField>,
    ) -> Result<Page<Product>> {
        debug!(filter = ?filter.case(), "Listing products");
        Ok(self.store.list_products(filter, page, sort).await?)
    }

    /// Product, review, and rating totals over the filter.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    #[instrument(skip(self))]
    pub async fn global_stats(&self, filter: &CatalogFilter) -> Result<CatalogStats> {
        Ok(self.store.catalog_stats(filter).await?)
    }

    /// Load a product with its rating histogram and, when it has reviews, an
    /// AI summary.
    ///
    /// Summary failures are logged and the detail is returned without one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn product_detail(&self, id: ProductId) -> Result<ProductDetail> {
        let product = self.product(id).await?;
        let rating_breakdown = self.store.rating_histogram(id).await?;

        let ai_summary = if product.review_count > 0 {
            self.summary(&product).await
        } else {
            None
        };

        Ok(ProductDetail {
            product,
            rating_breakdown,
            ai_summary,
        })
    }

    async fn product(&self, id: ProductId) -> Result<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {id}")))
    }

    async fn summary(&self, product: &Product) -> Option<String> {
        let assistant = self.assistant?;
        let reviews = match self.prompt_reviews(product.id).await {
            Ok(reviews) => reviews,
            Err(e) => {
                warn!(error = %e, "Could not load reviews for summary");
                return None;
            }
        };

        match assistant.summarize(product, &reviews).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, "Review summary unavailable");
                None
            }
        }
    }

    async fn prompt_reviews(&self, id: ProductId) -> Result<Vec<Review>> {
        let limit = u32::try_from(MAX_PROMPT_REVIEWS).unwrap_or(u32::MAX);
        Ok(self.store.recent_reviews(id, limit).await?)
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// List a product's reviews, optionally only one star rating.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(sort = %sort))]
    pub async fn list_reviews(
        &self,
        product_id: ProductId,
        rating: Option<Rating>,
        page: PageRequest,
        sort: SortSpec<ReviewSortField>,
    ) -> Result<Page<Review>> {
        self.store
            .list_reviews(product_id, rating, page, sort)
            .await
            .or_not_found(|| format!("product {product_id}"))
    }

    /// Validate and add a review, updating the product's rating aggregate in
    /// the same unit of work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for bad input and `AppError::NotFound`
    /// if the product does not exist.
    #[instrument(skip(self, input))]
    pub async fn add_review(&self, product_id: ProductId, input: &ReviewInput) -> Result<Review> {
        let draft = ReviewDraft::parse(product_id, input)?;
        let review = self
            .store
            .add_review(&draft)
            .await
            .or_not_found(|| format!("product {product_id}"))?;

        if let Some(assistant) = self.assistant {
            assistant.invalidate(product_id).await;
        }

        info!(review_id = %review.id, rating = review.rating.get(), "Review added");
        Ok(review)
    }

    // =========================================================================
    // Helpful votes
    // =========================================================================

    /// Toggle a helpful vote. Anonymous callers always add one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the review does not exist.
    #[instrument(skip(self), fields(anonymous = user.is_none()))]
    pub async fn toggle_helpful(&self, review_id: ReviewId, user: Option<&UserId>) -> Result<Review> {
        let (review, outcome) = self
            .store
            .toggle_helpful(review_id, user)
            .await
            .or_not_found(|| format!("review {review_id}"))?;

        info!(
            outcome = ?outcome,
            helpful_count = review.helpful_count,
            "Helpful vote toggled"
        );
        Ok(review)
    }

    /// Review IDs the user has currently voted helpful.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub async fn voted_review_ids(&self, user: &UserId) -> Result<Vec<ReviewId>> {
        Ok(self.store.voted_review_ids(user).await?)
    }

    // =========================================================================
    // Q&A
    // =========================================================================

    /// Answer a shopper question from the product's description and reviews.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank or overlong question,
    /// `AppError::NotFound` for an unknown product,
    /// `AppError::AssistantUnavailable` when no assistant is configured, and
    /// `AppError::Assistant` when the API call fails.
    #[instrument(skip(self, question))]
    pub async fn chat(&self, product_id: ProductId, question: &str) -> Result<String> {
        let question = chat_question(question)?;
        let product = self.product(product_id).await?;
        let assistant = self.assistant.ok_or(AppError::AssistantUnavailable)?;

        let reviews = self.prompt_reviews(product_id).await?;
        Ok(assistant.chat(&product, &reviews, &question).await?)
    }
}
