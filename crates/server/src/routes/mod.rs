//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                - Liveness
//! GET    /health/ready                          - Store reachability
//!
//! # Products
//! GET    /api/products                          - Filtered, sorted, paginated list
//! GET    /api/products/stats                    - Totals over the same filter
//! GET    /api/products/{id}                     - Detail with rating breakdown and AI summary
//! POST   /api/products/{id}/chat                - Ask about a product
//!
//! # Reviews
//! GET    /api/products/{id}/reviews             - Paginated reviews, optional rating filter
//! POST   /api/products/{id}/reviews             - Add a review
//! PUT    /api/products/reviews/{id}/helpful     - Toggle helpful vote (X-User-ID optional)
//! GET    /api/products/reviews/voted            - Review IDs voted by X-User-ID
//!
//! # User (X-User-ID required)
//! GET    /api/user/wishlist                     - Wishlisted product IDs
//! POST   /api/user/wishlist/{product_id}        - Toggle wishlist entry
//! GET    /api/user/notifications                - Newest first
//! POST   /api/user/notifications                - Create
//! DELETE /api/user/notifications                - Delete all
//! GET    /api/user/notifications/unread-count   - Unread count
//! PUT    /api/user/notifications/read-all       - Mark all read
//! PUT    /api/user/notifications/{id}/read      - Mark one read
//! DELETE /api/user/notifications/{id}           - Delete one
//! ```

pub mod extract;
pub mod products;
pub mod reviews;
pub mod user;

use axum::{
    Router,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{
    REQUEST_ID_HEADER, USER_ID_HEADER, helpful_rate_limiter, request_id_middleware,
};
use crate::state::AppState;

/// Create the product and review routes router.
pub fn product_routes(rate_limit: bool) -> Router<AppState> {
    let helpful = Router::new().route("/reviews/{id}/helpful", put(reviews::toggle_helpful));
    let helpful = match rate_limit.then(helpful_rate_limiter).flatten() {
        Some(limiter) => helpful.route_layer(limiter),
        None => helpful,
    };

    Router::new()
        .route("/", get(products::index))
        .route("/stats", get(products::stats))
        .route("/reviews/voted", get(reviews::voted))
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", get(reviews::index).post(reviews::create))
        .route("/{id}/chat", post(products::chat))
        .merge(helpful)
}

/// Create the per-user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/wishlist", get(user::wishlist))
        .route("/wishlist/{product_id}", post(user::toggle_wishlist))
        .route(
            "/notifications",
            get(user::notifications)
                .post(user::create_notification)
                .delete(user::delete_all_notifications),
        )
        .route("/notifications/unread-count", get(user::unread_count))
        .route("/notifications/read-all", put(user::mark_all_read))
        .route("/notifications/{id}/read", put(user::mark_read))
        .route(
            "/notifications/{id}",
            axum::routing::delete(user::delete_notification),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    let rate_limit = state.config().rate_limit;
    let cors = cors_layer(&state.config().cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/products", product_routes(rate_limit))
        .nest("/api/user", user_routes())
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, backend = state.store().backend(), "Store not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
