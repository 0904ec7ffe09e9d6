//! Product review service.
//!
//! Library half of the `product-review-server` binary: configuration, the
//! catalog store (`PostgreSQL` or in-memory), services, and the axum router.
//! The integration tests and the CLI build on these modules directly.
//!
//! # Architecture
//!
//! - `routes` - axum handlers, thin wrappers over `services`
//! - `services` - request-scoped business logic returning `AppError`
//! - `db` - [`db::Store`] dispatching to `PostgreSQL` or memory
//! - `assistant` - Anthropic Messages API client with a summary cache
//! - `product_review_core` - pure domain rules shared by both stores

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assistant;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
