//! Per-user ledgers: wishlist and notifications.
//!
//! Every operation is keyed by the caller's `X-User-ID`. Reads and deletes of
//! notifications only ever see the caller's own rows.

use tracing::{info, instrument};

use product_review_core::{NotificationDraft, NotificationId, NotificationInput, ProductId, UserId};

use crate::db::Store;
use crate::error::{NotFoundExt, Result};
use crate::models::{Notification, WishlistToggle};

/// Wishlist and notification service.
pub struct UserService<'a> {
    store: &'a Store,
    user: &'a UserId,
}

impl<'a> UserService<'a> {
    /// Create a service scoped to one user.
    #[must_use]
    pub const fn new(store: &'a Store, user: &'a UserId) -> Self {
        Self { store, user }
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Add the product to the wishlist, or remove it if already there.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(user_id = %self.user))]
    pub async fn toggle_wishlist(&self, product_id: ProductId) -> Result<WishlistToggle> {
        let wishlisted = self
            .store
            .toggle_wishlist(self.user, product_id)
            .await
            .or_not_found(|| format!("product {product_id}"))?;

        info!(wishlisted, "Wishlist toggled");
        Ok(WishlistToggle {
            product_id,
            wishlisted,
        })
    }

    /// Wishlisted product IDs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub async fn wishlist(&self) -> Result<Vec<ProductId>> {
        Ok(self.store.wishlist(self.user).await?)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Validate and create an unread notification.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank or overlong title or message.
    #[instrument(skip(self, input), fields(user_id = %self.user))]
    pub async fn create_notification(&self, input: &NotificationInput) -> Result<Notification> {
        let draft = NotificationDraft::parse(input)?;
        let notification = self.store.create_notification(self.user, &draft).await?;
        info!(notification_id = %notification.id, "Notification created");
        Ok(notification)
    }

    /// Notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        Ok(self.store.notifications(self.user).await?)
    }

    /// Number of unread notifications.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub async fn unread_count(&self) -> Result<u64> {
        Ok(self.store.unread_count(self.user).await?)
    }

    /// Mark one notification read. Unknown IDs are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub async fn mark_read(&self, id: NotificationId) -> Result<()> {
        Ok(self.store.mark_notification_read(self.user, id).await?)
    }

    /// Mark every notification read.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    #[instrument(skip(self), fields(user_id = %self.user))]
    pub async fn mark_all_read(&self) -> Result<()> {
        let updated = self.store.mark_all_notifications_read(self.user).await?;
        info!(updated, "Notifications marked read");
        Ok(())
    }

    /// Delete one notification. Unknown IDs are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub async fn delete(&self, id: NotificationId) -> Result<()> {
        Ok(self.store.delete_notification(self.user, id).await?)
    }

    /// Delete every notification.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    #[instrument(skip(self), fields(user_id = %self.user))]
    pub async fn delete_all(&self) -> Result<()> {
        let deleted = self.store.delete_all_notifications(self.user).await?;
        info!(deleted, "Notifications deleted");
        Ok(())
    }
}
