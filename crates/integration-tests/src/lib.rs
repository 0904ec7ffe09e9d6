//! Integration tests for the product review service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p product-review-integration-tests
//! ```
//!
//! Tests drive the assembled axum router in-process with
//! `tower::ServiceExt::oneshot` over the in-memory store, so no database or
//! network is needed. [`FakeAnthropic`] stands in for the Messages API when a
//! test needs the assistant.
//!
//! # Test Categories
//!
//! - `products` - Listing, filtering, sorting, paging, stats, detail
//! - `reviews` - Review posting, rating aggregates, helpful votes
//! - `user` - Wishlists and notifications
//! - `assistant` - AI summaries and product Q&A
//! - `operational` - Health checks, request IDs, rate limiting

use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::{Json, Router, routing::post};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use product_review_core::{ProductId, ReviewDraft, ReviewInput};
use product_review_server::config::{AssistantConfig, LogFormat, ServerConfig, StoreConfig};
use product_review_server::db::{MemoryStore, Store};
use product_review_server::models::{NewProduct, Product, Review};
use product_review_server::{AppState, app};

/// Largest response body the helpers will read.
const MAX_BODY: usize = 4 * 1024 * 1024;

/// Configuration for a test server: memory store, no assistant, no limiter.
#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        store: StoreConfig::Memory,
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        cors_origins: Vec::new(),
        rate_limit: false,
        assistant: None,
        summary_cache_ttl: Duration::from_secs(3600),
        sentry_dsn: None,
        sentry_environment: None,
        log_format: LogFormat::Pretty,
    }
}

/// A decoded HTTP response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    /// Parsed JSON body, or `Value::Null` for an empty or non-JSON body.
    pub json: Value,
}

impl TestResponse {
    /// The `error` message of a JSON error body.
    #[must_use]
    pub fn error(&self) -> &str {
        self.json["error"].as_str().unwrap_or_default()
    }
}

/// An in-process server over a fresh memory store.
pub struct TestContext {
    pub state: AppState,
    router: Router,
}

impl TestContext {
    /// Empty store, default test config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Empty store with a custom config.
    ///
    /// # Panics
    ///
    /// Panics if the assistant client cannot be built.
    #[must_use]
    pub fn with_config(config: ServerConfig) -> Self {
        let store = Store::Memory(MemoryStore::new());
        let state = AppState::new(config, store).expect("state");
        let router = app(state.clone());
        Self { state, router }
    }

    /// Empty store whose assistant talks to `fake`.
    #[must_use]
    pub fn with_assistant(fake: &FakeAnthropic) -> Self {
        let mut config = test_config();
        config.assistant = Some(fake.config());
        Self::with_config(config)
    }

    /// The store behind the router.
    #[must_use]
    pub fn store(&self) -> &Store {
        self.state.store()
    }

    /// Insert a product directly.
    ///
    /// # Panics
    ///
    /// Panics if the price does not parse or the insert fails.
    pub async fn add_product(&self, name: &str, categories: &[&str], price: &str) -> Product {
        let product = NewProduct {
            name: name.to_string(),
            description: format!("{name} description"),
            categories: categories.iter().map(|c| (*c).to_string()).collect::<BTreeSet<_>>(),
            price: price.parse().expect("price"),
            image_url: String::new(),
        };
        self.store().insert_product(&product).await.expect("insert product")
    }

    /// Insert a review directly (through the reconciling store path).
    ///
    /// # Panics
    ///
    /// Panics if the review is invalid or the insert fails.
    pub async fn add_review(&self, product_id: ProductId, rating: i64) -> Review {
        let input = ReviewInput {
            reviewer_name: "Tester".to_string(),
            comment: format!("A {rating}-star review for testing."),
            rating,
        };
        let draft = ReviewDraft::parse(product_id, &input).expect("valid review");
        self.store().add_review(&draft).await.expect("insert review")
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY)
            .await
            .expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            json,
        }
    }

    /// `GET` without headers.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, &[], None).await
    }

    /// `GET` as a user.
    pub async fn get_as(&self, user: &str, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, &[("x-user-id", user)], None).await
    }

    /// `POST` a JSON body without headers.
    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, &[], Some(body)).await
    }

    /// `POST` a JSON body as a user.
    pub async fn post_as(&self, user: &str, uri: &str, body: Option<Value>) -> TestResponse {
        self.send(Method::POST, uri, &[("x-user-id", user)], body).await
    }

    /// `PUT` with optional user.
    pub async fn put(&self, user: Option<&str>, uri: &str) -> TestResponse {
        match user {
            Some(user) => self.send(Method::PUT, uri, &[("x-user-id", user)], None).await,
            None => self.send(Method::PUT, uri, &[], None).await,
        }
    }

    /// `DELETE` as a user.
    pub async fn delete_as(&self, user: &str, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, &[("x-user-id", user)], None).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A valid review body.
#[must_use]
pub fn review_body(rating: i64) -> Value {
    json!({
        "reviewerName": "Sarah",
        "comment": "Fast delivery and good quality.",
        "rating": rating,
    })
}

// =============================================================================
// Fake Messages API
// =============================================================================

/// How the fake Messages API answers.
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// 200 with one text block.
    Text(String),
    /// An error status with an Anthropic error body.
    Error(StatusCode),
}

/// A local stand-in for the Anthropic Messages API.
pub struct FakeAnthropic {
    addr: SocketAddr,
    calls: Arc<AtomicUsize>,
}

impl FakeAnthropic {
    /// Start the fake on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind.
    pub async fn start(reply: FakeReply) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let handler = move |Json(request): Json<Value>| {
            let reply = reply.clone();
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let model = request["model"].as_str().unwrap_or("unknown").to_string();
                match reply {
                    FakeReply::Text(text) => (
                        StatusCode::OK,
                        Json(json!({
                            "id": "msg_test",
                            "type": "message",
                            "role": "assistant",
                            "model": model,
                            "stop_reason": "end_turn",
                            "content": [{"type": "text", "text": text}],
                            "usage": {"input_tokens": 10, "output_tokens": 5},
                        })),
                    ),
                    FakeReply::Error(status) => (
                        status,
                        Json(json!({
                            "type": "error",
                            "error": {"type": "api_error", "message": "upstream failure"},
                        })),
                    ),
                }
            }
        };

        let router = Router::new().route("/v1/messages", post(handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake");
        let addr = listener.local_addr().expect("fake addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, calls }
    }

    /// Assistant config pointing at this fake.
    #[must_use]
    pub fn config(&self) -> AssistantConfig {
        AssistantConfig {
            api_key: SecretString::from("sk-test-key"),
            model: "claude-test".to_string(),
            api_url: format!("http://{}/v1/messages", self.addr),
        }
    }

    /// Number of requests received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
