//! Prompt construction for review summaries and product Q&A.

use std::fmt::Write as _;

use crate::models::{Product, Review};

/// Most reviews included in a single prompt.
pub const MAX_PROMPT_REVIEWS: usize = 50;

pub(super) const SUMMARY_SYSTEM: &str = "You summarize customer reviews for an online store. \
Write two or three plain sentences covering what reviewers like and what they criticize. \
Do not invent facts that are not in the reviews. Do not use markdown.";

pub(super) const CHAT_SYSTEM: &str = "You answer shopper questions about a single product. \
Use only the product description and the customer reviews provided. \
If they do not contain the answer, say so briefly. Keep answers under 120 words.";

/// Render the product header shared by both prompts.
fn push_product(out: &mut String, product: &Product) {
    let _ = writeln!(out, "Product: {}", product.name);
    if !product.categories.is_empty() {
        let categories: Vec<&str> = product.categories.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Categories: {}", categories.join(", "));
    }
    let _ = writeln!(out, "Price: {}", product.price);
    if !product.description.is_empty() {
        let _ = writeln!(out, "Description: {}", product.description);
    }
}

/// Render up to [`MAX_PROMPT_REVIEWS`] reviews, in the order given.
fn push_reviews(out: &mut String, reviews: &[Review]) {
    let shown = reviews.len().min(MAX_PROMPT_REVIEWS);
    let _ = writeln!(out, "\nCustomer reviews ({shown} of {}):", reviews.len());
    for review in reviews.iter().take(MAX_PROMPT_REVIEWS) {
        let _ = writeln!(
            out,
            "- {}/5 by {}: {}",
            review.rating.get(),
            review.reviewer_name,
            review.comment
        );
    }
}

pub(super) fn summary_prompt(product: &Product, reviews: &[Review]) -> String {
    let mut out = String::new();
    push_product(&mut out, product);
    let _ = writeln!(
        out,
        "Average rating: {:.1} from {} reviews",
        product.average_rating, product.review_count
    );
    push_reviews(&mut out, reviews);
    out.push_str("\nSummarize these reviews.");
    out
}

pub(super) fn chat_prompt(product: &Product, reviews: &[Review], question: &str) -> String {
    let mut out = String::new();
    push_product(&mut out, product);
    push_reviews(&mut out, reviews);
    let _ = write!(out, "\nShopper question: {question}");
    out
}
