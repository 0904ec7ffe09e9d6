//! Health checks, request IDs, CORS, and the helpful-vote rate limit.

use axum::http::{Method, StatusCode};

use product_review_integration_tests::{TestContext, test_config};

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new();
    assert_eq!(ctx.get("/health").await.status, StatusCode::OK);
    assert_eq!(ctx.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let ctx = TestContext::new();
    let response = ctx.get("/api/products").await;
    let id = response
        .headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("request id");
    assert!(uuid_like(id), "{id}");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let ctx = TestContext::new();
    let response = ctx
        .send(
            Method::GET,
            "/api/products",
            &[("x-request-id", "edge-1234")],
            None,
        )
        .await;
    assert_eq!(
        response.headers.get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("edge-1234")
    );

    // Errors carry it too.
    let missing = ctx
        .send(Method::GET, "/api/products/999", &[("x-request-id", "edge-5678")], None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(
        missing.headers.get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("edge-5678")
    );
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let ctx = TestContext::new();
    let response = ctx
        .send(
            Method::GET,
            "/api/products",
            &[("origin", "http://localhost:3000")],
            None,
        )
        .await;
    assert_eq!(
        response
            .headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let mut config = test_config();
    config.cors_origins = vec!["https://shop.example".to_string()];
    let ctx = TestContext::with_config(config);

    let allowed = ctx
        .send(Method::GET, "/api/products", &[("origin", "https://shop.example")], None)
        .await;
    assert_eq!(
        allowed
            .headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://shop.example")
    );

    let denied = ctx
        .send(Method::GET, "/api/products", &[("origin", "https://evil.example")], None)
        .await;
    assert!(denied.headers.get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_helpful_votes_are_rate_limited_per_client() {
    let mut config = test_config();
    config.rate_limit = true;
    let ctx = TestContext::with_config(config);
    let product = ctx.add_product("Steam Deck OLED", &["Gaming"], "549.00").await;
    let review = ctx.add_review(product.id, 5).await;
    let uri = format!("/api/products/reviews/{}/helpful", review.id);

    let mut limited = false;
    for _ in 0..20 {
        let response = ctx
            .send(Method::PUT, &uri, &[("x-forwarded-for", "198.51.100.20")], None)
            .await;
        if response.status == StatusCode::TOO_MANY_REQUESTS {
            assert_eq!(response.error(), "Rate limited");
            limited = true;
            break;
        }
        assert_eq!(response.status, StatusCode::OK);
    }
    assert!(limited, "expected a 429 within 20 rapid votes");

    // Another client is unaffected.
    let other = ctx
        .send(Method::PUT, &uri, &[("x-forwarded-for", "198.51.100.21")], None)
        .await;
    assert_eq!(other.status, StatusCode::OK);

    // Reads are never limited.
    for _ in 0..20 {
        let response = ctx
            .send(
                Method::GET,
                &format!("/api/products/{}/reviews", product.id),
                &[("x-forwarded-for", "198.51.100.20")],
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
}

fn uuid_like(id: &str) -> bool {
    id.len() == 36 && id.chars().filter(|c| *c == '-').count() == 4
}
