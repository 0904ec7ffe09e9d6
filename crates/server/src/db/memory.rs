//! In-memory catalog store.
//!
//! All state sits behind a single `RwLock`, so every operation is atomic with
//! respect to every other one, the same guarantee the `PostgreSQL` backend gets
//! from row locks and transactions.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use tokio::sync::RwLock;

use product_review_core::{
    CatalogFilter, CatalogStats, NotificationDraft, NotificationId, Page, PageRequest, ProductId,
    ProductSortField, Rating, RatingHistogram, RatingSummary, ReviewDraft, ReviewId,
    ReviewSortField, SortSpec, ToggleOutcome, UserId, VoteState,
};

use super::RepositoryError;
use crate::models::{NewProduct, Notification, Product, Review};

#[derive(Default)]
struct MemoryState {
    products: BTreeMap<ProductId, Product>,
    reviews: BTreeMap<ReviewId, Review>,
    votes: BTreeSet<(UserId, ReviewId)>,
    /// Insertion-ordered per user.
    wishlists: BTreeMap<UserId, Vec<ProductId>>,
    notifications: BTreeMap<NotificationId, Notification>,
    last_product_id: i32,
    last_review_id: i32,
    last_notification_id: i32,
}

impl MemoryState {
    fn reviews_of(&self, product_id: ProductId) -> impl Iterator<Item = &Review> {
        self.reviews
            .values()
            .filter(move |r| r.product_id == product_id)
    }

    fn matching_products<'a>(
        &'a self,
        filter: &'a CatalogFilter,
    ) -> impl Iterator<Item = &'a Product> {
        self.products
            .values()
            .filter(move |p| filter.matches(&p.name, p.categories.iter().map(String::as_str)))
    }

    fn reconcile(&mut self, product_id: ProductId) -> Result<RatingSummary, RepositoryError> {
        let summary = RatingSummary::from_ratings(self.reviews_of(product_id).map(|r| r.rating));
        let product = self
            .products
            .get_mut(&product_id)
            .ok_or(RepositoryError::NotFound)?;
        product.apply_summary(summary);
        Ok(summary)
    }
}

/// Process-local catalog store.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

fn compare_products(a: &Product, b: &Product, sort: SortSpec<ProductSortField>) -> Ordering {
    let ordering = match sort.field {
        ProductSortField::Id => a.id.cmp(&b.id),
        ProductSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        ProductSortField::Price => a.price.cmp(&b.price),
        ProductSortField::AverageRating => a.average_rating.total_cmp(&b.average_rating),
        ProductSortField::ReviewCount => a.review_count.cmp(&b.review_count),
    };
    sort.direction.apply(ordering).then_with(|| a.id.cmp(&b.id))
}

fn compare_reviews(a: &Review, b: &Review, sort: SortSpec<ReviewSortField>) -> Ordering {
    let ordering = match sort.field {
        ReviewSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        ReviewSortField::Rating => a.rating.cmp(&b.rating),
        ReviewSortField::HelpfulCount => a.helpful_count.cmp(&b.helpful_count),
        ReviewSortField::Id => a.id.cmp(&b.id),
    };
    // Ties follow the requested direction so equal timestamps stay newest first.
    sort.direction.apply(ordering.then_with(|| a.id.cmp(&b.id)))
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::unused_async)]
    pub(super) async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    pub(super) async fn list_products(
        &self,
        filter: &CatalogFilter,
        page: PageRequest,
        sort: SortSpec<ProductSortField>,
    ) -> Result<Page<Product>, RepositoryError> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state.matching_products(filter).cloned().collect();
        products.sort_by(|a, b| compare_products(a, b, sort));
        Ok(Page::from_sorted(products, page))
    }

    pub(super) async fn catalog_stats(
        &self,
        filter: &CatalogFilter,
    ) -> Result<CatalogStats, RepositoryError> {
        let state = self.state.read().await;
        let matching: BTreeSet<ProductId> = state.matching_products(filter).map(|p| p.id).collect();
        let ratings = state
            .reviews
            .values()
            .filter(|r| matching.contains(&r.product_id))
            .map(|r| r.rating);
        Ok(CatalogStats::new(
            matching.len() as u64,
            RatingSummary::from_ratings(ratings),
        ))
    }

    pub(super) async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    pub(super) async fn count_products(&self) -> Result<u64, RepositoryError> {
        Ok(self.state.read().await.products.len() as u64)
    }

    pub(super) async fn product_ids(&self) -> Result<Vec<ProductId>, RepositoryError> {
        Ok(self.state.read().await.products.keys().copied().collect())
    }

    pub(super) async fn insert_product(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let mut state = self.state.write().await;
        state.last_product_id += 1;
        let product = Product {
            id: ProductId::new(state.last_product_id),
            name: new.name.clone(),
            description: new.description.clone(),
            categories: new.categories.clone(),
            price: new.price,
            image_url: new.image_url.clone(),
            average_rating: 0.0,
            review_count: 0,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    pub(super) async fn clear(&self) -> Result<(), RepositoryError> {
        *self.state.write().await = MemoryState::default();
        Ok(())
    }

    pub(super) async fn rating_histogram(
        &self,
        id: ProductId,
    ) -> Result<RatingHistogram, RepositoryError> {
        let state = self.state.read().await;
        Ok(RatingHistogram::from_ratings(
            state.reviews_of(id).map(|r| r.rating),
        ))
    }

    pub(super) async fn list_reviews(
        &self,
        product_id: ProductId,
        rating: Option<Rating>,
        page: PageRequest,
        sort: SortSpec<ReviewSortField>,
    ) -> Result<Page<Review>, RepositoryError> {
        let state = self.state.read().await;
        if !state.products.contains_key(&product_id) {
            return Err(RepositoryError::NotFound);
        }
        let mut reviews: Vec<Review> = state
            .reviews_of(product_id)
            .filter(|r| rating.is_none_or(|wanted| r.rating == wanted))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| compare_reviews(a, b, sort));
        Ok(Page::from_sorted(reviews, page))
    }

    pub(super) async fn recent_reviews(
        &self,
        product_id: ProductId,
        limit: u32,
    ) -> Result<Vec<Review>, RepositoryError> {
        let state = self.state.read().await;
        let mut reviews: Vec<Review> = state.reviews_of(product_id).cloned().collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        reviews.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(reviews)
    }

    pub(super) async fn add_review(&self, draft: &ReviewDraft) -> Result<Review, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&draft.product_id) {
            return Err(RepositoryError::NotFound);
        }

        state.last_review_id += 1;
        let review = Review {
            id: ReviewId::new(state.last_review_id),
            product_id: draft.product_id,
            reviewer_name: draft.reviewer_name.clone(),
            comment: draft.comment.clone(),
            rating: draft.rating,
            helpful_count: 0,
            created_at: Utc::now(),
        };
        state.reviews.insert(review.id, review.clone());
        state.reconcile(draft.product_id)?;
        Ok(review)
    }

    pub(super) async fn recompute_product_stats(
        &self,
        id: ProductId,
    ) -> Result<RatingSummary, RepositoryError> {
        self.state.write().await.reconcile(id)
    }

    pub(super) async fn toggle_helpful(
        &self,
        review_id: ReviewId,
        user: Option<&UserId>,
    ) -> Result<(Review, ToggleOutcome), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.reviews.contains_key(&review_id) {
            return Err(RepositoryError::NotFound);
        }

        let outcome = match user {
            None => ToggleOutcome::Anonymous,
            Some(user) => {
                let key = (user.clone(), review_id);
                if state.votes.remove(&key) {
                    ToggleOutcome::for_state(VoteState::Voted)
                } else {
                    state.votes.insert(key);
                    ToggleOutcome::for_state(VoteState::NotVoted)
                }
            }
        };

        let review = state
            .reviews
            .get_mut(&review_id)
            .ok_or(RepositoryError::NotFound)?;
        review.helpful_count = outcome.delta().apply(Some(review.helpful_count));
        Ok((review.clone(), outcome))
    }

    pub(super) async fn voted_review_ids(
        &self,
        user: &UserId,
    ) -> Result<Vec<ReviewId>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .votes
            .iter()
            .filter(|(voter, _)| voter == user)
            .map(|(_, review_id)| *review_id)
            .collect())
    }

    pub(super) async fn toggle_wishlist(
        &self,
        user: &UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&product_id) {
            return Err(RepositoryError::NotFound);
        }

        let items = state.wishlists.entry(user.clone()).or_default();
        if let Some(index) = items.iter().position(|id| *id == product_id) {
            items.remove(index);
            Ok(false)
        } else {
            items.push(product_id);
            Ok(true)
        }
    }

    pub(super) async fn wishlist(&self, user: &UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.wishlists.get(user).cloned().unwrap_or_default())
    }

    pub(super) async fn create_notification(
        &self,
        user: &UserId,
        draft: &NotificationDraft,
    ) -> Result<Notification, RepositoryError> {
        let mut state = self.state.write().await;
        state.last_notification_id += 1;
        let notification = Notification {
            id: NotificationId::new(state.last_notification_id),
            user_id: user.clone(),
            title: draft.title.clone(),
            message: draft.message.clone(),
            product_id: draft.product_id,
            is_read: false,
            created_at: Utc::now(),
        };
        state
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    pub(super) async fn notifications(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let state = self.state.read().await;
        let mut notifications: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| &n.user_id == user)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(notifications)
    }

    pub(super) async fn unread_count(&self, user: &UserId) -> Result<u64, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .values()
            .filter(|n| &n.user_id == user && !n.is_read)
            .count() as u64)
    }

    pub(super) async fn mark_notification_read(
        &self,
        user: &UserId,
        id: NotificationId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if let Some(notification) = state
            .notifications
            .get_mut(&id)
            .filter(|n| &n.user_id == user)
        {
            notification.is_read = true;
        }
        Ok(())
    }

    pub(super) async fn mark_all_notifications_read(
        &self,
        user: &UserId,
    ) -> Result<u64, RepositoryError> {
        let mut state = self.state.write().await;
        let mut changed = 0;
        for notification in state
            .notifications
            .values_mut()
            .filter(|n| &n.user_id == user && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    pub(super) async fn delete_notification(
        &self,
        user: &UserId,
        id: NotificationId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state
            .notifications
            .get(&id)
            .is_some_and(|n| &n.user_id == user)
        {
            state.notifications.remove(&id);
        }
        Ok(())
    }

    pub(super) async fn delete_all_notifications(
        &self,
        user: &UserId,
    ) -> Result<u64, RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.notifications.len();
        state.notifications.retain(|_, n| &n.user_id != user);
        Ok((before - state.notifications.len()) as u64)
    }
}
