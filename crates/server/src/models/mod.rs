//! Domain models for the catalog API.
//!
//! These are the shapes handlers send to clients (camelCase JSON). Store
//! backends build them from their own row types.

pub mod notification;
pub mod product;
pub mod review;

pub use notification::Notification;
pub use product::{NewProduct, Product, ProductDetail, WishlistToggle};
pub use review::Review;
