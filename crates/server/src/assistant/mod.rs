//! Review assistant backed by the Anthropic Messages API.
//!
//! Two operations:
//!
//! - [`Assistant::summarize`] - a short summary of a product's reviews,
//!   cached per product with `moka` until the TTL expires or a new review
//!   invalidates it
//! - [`Assistant::chat`] - answer a shopper question from the product's
//!   description and reviews (never cached)
//!
//! Both send at most [`MAX_PROMPT_REVIEWS`] reviews, newest first.

mod client;
mod error;
mod prompts;
mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use product_review_core::ProductId;

use crate::config::AssistantConfig;
use crate::models::{Product, Review};

pub use client::AssistantClient;
pub use error::{ApiError, ApiErrorResponse, AssistantError};
pub use prompts::MAX_PROMPT_REVIEWS;
pub use types::{ContentBlock, Message, MessagesRequest, MessagesResponse, Usage};

const SUMMARY_MAX_TOKENS: u32 = 300;
const CHAT_MAX_TOKENS: u32 = 500;

/// Summary and chat collaborator with a per-product summary cache.
#[derive(Clone)]
pub struct Assistant {
    inner: Arc<AssistantInner>,
}

struct AssistantInner {
    client: AssistantClient,
    summaries: Cache<ProductId, CachedSummary>,
}

/// A summary tagged with the review count it was generated from.
///
/// A summary written back after a concurrent invalidation carries the old
/// count and is never served for the newer review set.
#[derive(Clone)]
struct CachedSummary {
    review_count: i32,
    text: String,
}

impl Assistant {
    /// Create an assistant from config.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError` if the HTTP client cannot be built.
    pub fn new(config: &AssistantConfig, summary_ttl: Duration) -> Result<Self, AssistantError> {
        let client = AssistantClient::new(config)?;
        let summaries = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(summary_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(AssistantInner { client, summaries }),
        })
    }

    /// Summarize a product's reviews, using the cached summary when present.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError` if the API call fails.
    #[instrument(skip(self, product, reviews), fields(product_id = %product.id))]
    pub async fn summarize(
        &self,
        product: &Product,
        reviews: &[Review],
    ) -> Result<String, AssistantError> {
        if let Some(cached) = self.inner.summaries.get(&product.id).await {
            if cached.review_count == product.review_count {
                debug!("Summary cache hit");
                return Ok(cached.text);
            }
            debug!(cached_for = cached.review_count, "Discarding outdated summary");
        }

        let prompt = prompts::summary_prompt(product, reviews);
        let summary = self
            .inner
            .client
            .complete(prompts::SUMMARY_SYSTEM, prompt, SUMMARY_MAX_TOKENS)
            .await?;

        self.inner
            .summaries
            .insert(
                product.id,
                CachedSummary {
                    review_count: product.review_count,
                    text: summary.clone(),
                },
            )
            .await;
        Ok(summary)
    }

    /// Answer a question about a product.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError` if the API call fails.
    #[instrument(skip(self, product, reviews, question), fields(product_id = %product.id))]
    pub async fn chat(
        &self,
        product: &Product,
        reviews: &[Review],
        question: &str,
    ) -> Result<String, AssistantError> {
        let prompt = prompts::chat_prompt(product, reviews, question);
        self.inner
            .client
            .complete(prompts::CHAT_SYSTEM, prompt, CHAT_MAX_TOKENS)
            .await
    }

    /// Drop the cached summary of a product.
    pub async fn invalidate(&self, product_id: ProductId) {
        self.inner.summaries.invalidate(&product_id).await;
    }

    /// Whether a summary is cached for a product.
    #[must_use]
    pub fn has_cached_summary(&self, product_id: ProductId) -> bool {
        self.inner.summaries.contains_key(&product_id)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config() -> AssistantConfig {
        AssistantConfig {
            api_key: SecretString::from("sk-test-key"),
            model: "claude-test".to_string(),
            // Nothing listens here; tests below never reach the network.
            api_url: "http://127.0.0.1:9/v1/messages".to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalidate_drops_cached_summary() {
        let assistant = Assistant::new(&config(), Duration::from_secs(60)).expect("assistant");
        let id = ProductId::new(4);
        assistant
            .inner
            .summaries
            .insert(
                id,
                CachedSummary {
                    review_count: 3,
                    text: "Great sound.".to_string(),
                },
            )
            .await;
        assert!(assistant.has_cached_summary(id));

        assistant.invalidate(id).await;
        assert!(!assistant.has_cached_summary(id));
    }

    fn product(review_count: i32) -> Product {
        Product {
            id: ProductId::new(9),
            name: "JBL Flip 6".to_string(),
            description: "Portable speaker".to_string(),
            categories: std::collections::BTreeSet::new(),
            price: "129.95".parse().expect("price"),
            image_url: String::new(),
            average_rating: 4.0,
            review_count,
        }
    }

    #[tokio::test]
    async fn test_summary_for_older_review_set_is_not_served() {
        let assistant = Assistant::new(&config(), Duration::from_secs(60)).expect("assistant");
        // Written back after a review landed mid-request.
        assistant
            .inner
            .summaries
            .insert(
                ProductId::new(9),
                CachedSummary {
                    review_count: 1,
                    text: "Loud and clear.".to_string(),
                },
            )
            .await;

        let hit = assistant.summarize(&product(1), &[]).await.expect("cache hit");
        assert_eq!(hit, "Loud and clear.");

        // The product now has two reviews; the stale entry forces a fresh
        // request, which fails because nothing listens on the test URL.
        assert!(assistant.summarize(&product(2), &[]).await.is_err());
    }

    #[test]
    fn test_invalid_api_key_is_rejected() {
        let mut cfg = config();
        cfg.api_key = SecretString::from("bad\nkey");
        let err = Assistant::new(&cfg, Duration::from_secs(60)).err();
        assert!(matches!(err, Some(AssistantError::InvalidApiKey(_))));
    }
}
