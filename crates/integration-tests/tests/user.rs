//! Wishlists and notifications.

use axum::http::StatusCode;
use serde_json::json;

use product_review_integration_tests::TestContext;

#[tokio::test]
async fn test_wishlist_toggle_keeps_insertion_order() {
    let ctx = TestContext::new();
    let first = ctx.add_product("Sony WH-1000XM5", &["Audio"], "399.99").await;
    let second = ctx.add_product("Apple Watch Ultra 2", &["Wearables"], "799.00").await;
    let third = ctx.add_product("Kindle Paperwhite", &["Electronics"], "149.99").await;

    for product in [&third, &first, &second] {
        let response = ctx
            .post_as("u1", &format!("/api/user/wishlist/{}", product.id), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json["productId"], product.id.as_i32());
        assert_eq!(response.json["wishlisted"], true);
    }

    let list = ctx.get_as("u1", "/api/user/wishlist").await;
    assert_eq!(
        list.json,
        json!([third.id.as_i32(), first.id.as_i32(), second.id.as_i32()])
    );

    let removed = ctx
        .post_as("u1", &format!("/api/user/wishlist/{}", first.id), None)
        .await;
    assert_eq!(removed.json["wishlisted"], false);
    let list = ctx.get_as("u1", "/api/user/wishlist").await;
    assert_eq!(list.json, json!([third.id.as_i32(), second.id.as_i32()]));

    // Re-adding goes to the end.
    ctx.post_as("u1", &format!("/api/user/wishlist/{}", first.id), None)
        .await;
    let list = ctx.get_as("u1", "/api/user/wishlist").await;
    assert_eq!(
        list.json,
        json!([third.id.as_i32(), second.id.as_i32(), first.id.as_i32()])
    );
}

#[tokio::test]
async fn test_wishlists_are_per_user() {
    let ctx = TestContext::new();
    let product = ctx.add_product("GoPro Hero 12", &["Cameras"], "399.00").await;
    ctx.post_as("alice", &format!("/api/user/wishlist/{}", product.id), None)
        .await;

    assert_eq!(
        ctx.get_as("alice", "/api/user/wishlist").await.json,
        json!([product.id.as_i32()])
    );
    assert_eq!(ctx.get_as("bob", "/api/user/wishlist").await.json, json!([]));
}

#[tokio::test]
async fn test_wishlist_unknown_product_is_not_found() {
    let ctx = TestContext::new();
    let response = ctx.post_as("u1", "/api/user/wishlist/77", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(ctx.get_as("u1", "/api/user/wishlist").await.json, json!([]));
}

#[tokio::test]
async fn test_user_routes_require_header() {
    let ctx = TestContext::new();
    for uri in [
        "/api/user/wishlist",
        "/api/user/notifications",
        "/api/user/notifications/unread-count",
    ] {
        let response = ctx.get(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.error(), "Bad request: X-User-ID header is required");
    }

    let blank = ctx.get_as("   ", "/api/user/wishlist").await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notification_lifecycle() {
    let ctx = TestContext::new();
    let product = ctx.add_product("Nintendo Switch OLED", &["Gaming"], "349.99").await;

    let created = ctx
        .post_as(
            "u1",
            "/api/user/notifications",
            Some(json!({
                "title": "Price drop",
                "message": "Nintendo Switch OLED is on sale",
                "productId": product.id.as_i32(),
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.json["isRead"], false);
    assert_eq!(created.json["userId"], "u1");
    assert_eq!(created.json["productId"], product.id.as_i32());
    let first_id = created.json["id"].as_i64().expect("id");

    let second = ctx
        .post_as(
            "u1",
            "/api/user/notifications",
            Some(json!({"title": "Welcome", "message": "Thanks for signing up"})),
        )
        .await;
    assert!(second.json["productId"].is_null());
    let second_id = second.json["id"].as_i64().expect("id");

    let list = ctx.get_as("u1", "/api/user/notifications").await;
    let ids: Vec<i64> = list.json
        .as_array()
        .expect("list")
        .iter()
        .map(|n| n["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(ids, [second_id, first_id]);

    let unread = ctx.get_as("u1", "/api/user/notifications/unread-count").await;
    assert_eq!(unread.json, json!({"count": 2}));

    let read = ctx
        .put(Some("u1"), &format!("/api/user/notifications/{first_id}/read"))
        .await;
    assert_eq!(read.status, StatusCode::OK);
    let unread = ctx.get_as("u1", "/api/user/notifications/unread-count").await;
    assert_eq!(unread.json["count"], 1);

    let all = ctx.put(Some("u1"), "/api/user/notifications/read-all").await;
    assert_eq!(all.status, StatusCode::OK);
    let unread = ctx.get_as("u1", "/api/user/notifications/unread-count").await;
    assert_eq!(unread.json["count"], 0);

    let deleted = ctx
        .delete_as("u1", &format!("/api/user/notifications/{first_id}"))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    let list = ctx.get_as("u1", "/api/user/notifications").await;
    assert_eq!(list.json.as_array().expect("list").len(), 1);

    let cleared = ctx.delete_as("u1", "/api/user/notifications").await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(ctx.get_as("u1", "/api/user/notifications").await.json, json!([]));
}

#[tokio::test]
async fn test_missing_notification_ids_are_ignored() {
    let ctx = TestContext::new();
    let read = ctx.put(Some("u1"), "/api/user/notifications/404/read").await;
    assert_eq!(read.status, StatusCode::OK);
    let deleted = ctx.delete_as("u1", "/api/user/notifications/404").await;
    assert_eq!(deleted.status, StatusCode::OK);
}

#[tokio::test]
async fn test_notifications_are_scoped_to_their_owner() {
    let ctx = TestContext::new();
    let created = ctx
        .post_as(
            "alice",
            "/api/user/notifications",
            Some(json!({"title": "Back in stock", "message": "Your item is back"})),
        )
        .await;
    let id = created.json["id"].as_i64().expect("id");

    assert_eq!(ctx.get_as("bob", "/api/user/notifications").await.json, json!([]));

    ctx.put(Some("bob"), &format!("/api/user/notifications/{id}/read"))
        .await;
    ctx.delete_as("bob", &format!("/api/user/notifications/{id}"))
        .await;
    ctx.delete_as("bob", "/api/user/notifications").await;

    let list = ctx.get_as("alice", "/api/user/notifications").await;
    let notifications = list.json.as_array().expect("list");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications.first().expect("one")["isRead"], false);
}

#[tokio::test]
async fn test_notification_validation() {
    let ctx = TestContext::new();
    let blank = ctx
        .post_as(
            "u1",
            "/api/user/notifications",
            Some(json!({"title": " ", "message": "body"})),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.error(), "title is required");

    let long = ctx
        .post_as(
            "u1",
            "/api/user/notifications",
            Some(json!({"title": "t".repeat(201), "message": "body"})),
        )
        .await;
    assert_eq!(long.status, StatusCode::BAD_REQUEST);
    assert_eq!(long.error(), "title must be at most 200 characters");

    let bad_id = ctx.put(Some("u1"), "/api/user/notifications/abc/read").await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
}
