//! Notification domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use product_review_core::{NotificationId, ProductId, UserId};

/// A message addressed to a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    /// Related product, if any. May reference a product that no longer exists.
    pub product_id: Option<ProductId>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
