//! Core types for the review service.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod rating;
pub mod user;

pub use id::*;
pub use price::{Price, PriceError};
pub use rating::{Rating, RatingError};
pub use user::{UserId, UserIdError};
