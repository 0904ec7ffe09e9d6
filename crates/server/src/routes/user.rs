//! Wishlist and notification handlers. Every route requires `X-User-ID`.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use product_review_core::{NotificationId, NotificationInput, ProductId};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::{Notification, WishlistToggle};
use crate::services::UserService;
use crate::state::AppState;

use super::extract::{ApiJson, ApiPath};

/// Unread notification count.
#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: u64,
}

/// `GET /api/user/wishlist`
pub async fn wishlist(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<ProductId>>> {
    Ok(Json(UserService::new(state.store(), &user).wishlist().await?))
}

/// `POST /api/user/wishlist/{product_id}`
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<WishlistToggle>> {
    let toggle = UserService::new(state.store(), &user)
        .toggle_wishlist(product_id)
        .await?;
    Ok(Json(toggle))
}

/// `GET /api/user/notifications`
pub async fn notifications(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Notification>>> {
    Ok(Json(UserService::new(state.store(), &user).notifications().await?))
}

/// `GET /api/user/notifications/unread-count`
pub async fn unread_count(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<UnreadCount>> {
    let count = UserService::new(state.store(), &user).unread_count().await?;
    Ok(Json(UnreadCount { count }))
}

/// `POST /api/user/notifications`
pub async fn create_notification(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(input): ApiJson<NotificationInput>,
) -> Result<Json<Notification>> {
    let notification = UserService::new(state.store(), &user)
        .create_notification(&input)
        .await?;
    Ok(Json(notification))
}

/// `PUT /api/user/notifications/{id}/read`
pub async fn mark_read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<NotificationId>,
) -> Result<StatusCode> {
    UserService::new(state.store(), &user).mark_read(id).await?;
    Ok(StatusCode::OK)
}

/// `PUT /api/user/notifications/read-all`
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<StatusCode> {
    UserService::new(state.store(), &user).mark_all_read().await?;
    Ok(StatusCode::OK)
}

/// `DELETE /api/user/notifications/{id}`
pub async fn delete_notification(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<NotificationId>,
) -> Result<StatusCode> {
    UserService::new(state.store(), &user).delete(id).await?;
    Ok(StatusCode::OK)
}

/// `DELETE /api/user/notifications`
pub async fn delete_all_notifications(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<StatusCode> {
    UserService::new(state.store(), &user).delete_all().await?;
    Ok(StatusCode::OK)
}
