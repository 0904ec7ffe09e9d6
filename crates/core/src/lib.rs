//! Product Review Core - Domain types and rating logic.
//!
//! This crate provides the pieces of the review service that must behave the
//! same regardless of where data is stored:
//! - `server` - HTTP API over `PostgreSQL` or the in-memory store
//! - `cli` - Migrations, seeding, and stats reconciliation
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Both store backends call into it, so aggregate
//! statistics, filter semantics, and vote transitions cannot diverge.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, user identifiers, ratings, and prices
//! - [`stats`] - Rating summaries, histograms, and catalog-wide stats
//! - [`filter`] - Category/search filter normalization and composition
//! - [`paging`] - Page requests, sort specifications, and page envelopes
//! - [`vote`] - Helpful-vote toggle transitions
//! - [`validation`] - Input validation for reviews, notifications, and chat

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod paging;
pub mod stats;
pub mod types;
pub mod validation;
pub mod vote;

pub use filter::{CatalogFilter, FilterCase, normalize_category, normalize_filter};
pub use paging::{
    Page, PageRequest, ProductSortField, ReviewSortField, SortDirection, SortField, SortSpec,
};
pub use stats::{CatalogStats, RatingHistogram, RatingSummary, round_to_tenth};
pub use types::*;
pub use validation::{
    NotificationDraft, NotificationInput, ReviewDraft, ReviewInput, ValidationError, chat_question,
};
pub use vote::{HelpfulDelta, ToggleOutcome, VoteState};
