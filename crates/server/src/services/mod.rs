//! Business logic services.
//!
//! # Services
//!
//! - `catalog` - Product listing, detail, reviews, helpful votes, Q&A
//! - `user` - Per-user wishlists and notifications
//!
//! Services borrow the store (and assistant) from [`AppState`](crate::state::AppState)
//! for the duration of one request and return [`AppError`](crate::error::AppError)
//! directly.

pub mod catalog;
pub mod user;

pub use catalog::CatalogService;
pub use user::UserService;
