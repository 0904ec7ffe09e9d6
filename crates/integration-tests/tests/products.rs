//! Product listing, filtering, paging, stats, and detail.

use axum::http::StatusCode;
use serde_json::json;

use product_review_integration_tests::TestContext;

async fn catalog() -> TestContext {
    let ctx = TestContext::new();
    ctx.add_product("PS5 DualSense Controller", &["Gaming", "Accessories"], "69.99")
        .await;
    ctx.add_product("iPhone 15 Pro", &["Electronics", "Smartphones"], "999.99")
        .await;
    ctx.add_product("Asus ROG Zephyrus", &["Laptops", "Gaming"], "1799.00")
        .await;
    ctx.add_product("Bellroy Tech Kit", &["Accessories"], "59.00")
        .await;
    ctx
}

fn names(json: &serde_json::Value) -> Vec<String> {
    json["content"]
        .as_array()
        .expect("content")
        .iter()
        .map(|p| p["name"].as_str().expect("name").to_string())
        .collect()
}

#[tokio::test]
async fn test_default_sort_is_name_ascending() {
    let ctx = catalog().await;
    let response = ctx.get("/api/products").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        names(&response.json),
        [
            "Asus ROG Zephyrus",
            "Bellroy Tech Kit",
            "iPhone 15 Pro",
            "PS5 DualSense Controller"
        ]
    );
    assert_eq!(response.json["totalElements"], 4);
    assert_eq!(response.json["number"], 0);
    assert_eq!(response.json["size"], 10);
    assert_eq!(response.json["first"], true);
    assert_eq!(response.json["last"], true);
}

#[tokio::test]
async fn test_category_filter_is_exact() {
    let ctx = catalog().await;
    let response = ctx.get("/api/products?category=Gaming").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        names(&response.json),
        ["Asus ROG Zephyrus", "PS5 DualSense Controller"]
    );
    for product in response.json["content"].as_array().expect("content") {
        let categories = product["categories"].as_array().expect("categories");
        assert!(categories.contains(&json!("Gaming")));
    }

    let lower = ctx.get("/api/products?category=gaming").await;
    assert_eq!(lower.json["totalElements"], 0);
}

#[tokio::test]
async fn test_category_all_means_no_filter() {
    let ctx = catalog().await;
    let unfiltered = ctx.get("/api/products").await;

    for uri in [
        "/api/products?category=All",
        "/api/products?category=all",
        "/api/products?category=",
        "/api/products?category=%20%20",
    ] {
        let response = ctx.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
        assert_eq!(response.json, unfiltered.json, "{uri}");
    }
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_combines_with_category() {
    let ctx = catalog().await;

    let search = ctx.get("/api/products?search=ROG").await;
    assert_eq!(names(&search.json), ["Asus ROG Zephyrus"]);

    let search = ctx.get("/api/products?search=o").await;
    assert_eq!(search.json["totalElements"], 4);

    let both = ctx
        .get("/api/products?category=Accessories&search=controller")
        .await;
    assert_eq!(names(&both.json), ["PS5 DualSense Controller"]);
}

#[tokio::test]
async fn test_sort_by_price_desc() {
    let ctx = catalog().await;
    let response = ctx.get("/api/products?sort=price,DESC").await;

    let prices: Vec<f64> = response.json["content"]
        .as_array()
        .expect("content")
        .iter()
        .map(|p| p["price"].as_f64().expect("price"))
        .collect();
    assert_eq!(prices, [1799.0, 999.99, 69.99, 59.0]);

    let asc = ctx.get("/api/products?sort=price,sideways").await;
    assert_eq!(names(&asc.json)[0], "Bellroy Tech Kit");
}

#[tokio::test]
async fn test_unknown_sort_field_is_bad_request() {
    let ctx = catalog().await;
    let response = ctx.get("/api/products?sort=password,asc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "cannot sort by 'password'");
}

#[tokio::test]
async fn test_invalid_page_parameters_are_bad_request() {
    let ctx = catalog().await;
    assert_eq!(
        ctx.get("/api/products?page=-1").await.status,
        StatusCode::BAD_REQUEST
    );
    let response = ctx.get("/api/products?page=abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.error().is_empty());
}

#[tokio::test]
async fn test_pages_of_twenty_five_products() {
    let ctx = TestContext::new();
    for i in 0..25 {
        ctx.add_product(&format!("Product {i:02}"), &["Bulk"], "10.00")
            .await;
    }

    let first = ctx.get("/api/products?page=0&size=10").await;
    assert_eq!(first.json["content"].as_array().expect("content").len(), 10);
    assert_eq!(first.json["totalElements"], 25);
    assert_eq!(first.json["totalPages"], 3);
    assert_eq!(first.json["first"], true);
    assert_eq!(first.json["last"], false);

    let last = ctx.get("/api/products?page=2&size=10").await;
    assert_eq!(last.json["content"].as_array().expect("content").len(), 5);
    assert_eq!(names(&last.json)[0], "Product 20");
    assert_eq!(last.json["last"], true);

    let beyond = ctx.get("/api/products?page=7&size=10").await;
    assert_eq!(beyond.status, StatusCode::OK);
    assert!(beyond.json["content"].as_array().expect("content").is_empty());
}

#[tokio::test]
async fn test_page_size_is_clamped() {
    let ctx = TestContext::new();
    for i in 0..3 {
        ctx.add_product(&format!("Item {i}"), &[], "1.00").await;
    }

    let huge = ctx.get("/api/products?size=100000").await;
    assert_eq!(huge.json["size"], 100);

    let zero = ctx.get("/api/products?size=0").await;
    assert_eq!(zero.json["size"], 1);
    assert_eq!(zero.json["totalPages"], 3);
}

#[tokio::test]
async fn test_global_stats_follow_the_filter() {
    let ctx = catalog().await;
    let products = ctx.get("/api/products?sort=id").await;
    let ids: Vec<i32> = products.json["content"]
        .as_array()
        .expect("content")
        .iter()
        .map(|p| i32::try_from(p["id"].as_i64().expect("id")).expect("i32"))
        .collect();

    // Controller (Gaming): 5, 4. iPhone: 1. Zephyrus (Gaming): 3.
    for (index, rating) in [(0, 5), (0, 4), (1, 1), (2, 3)] {
        ctx.add_review(product_review_core::ProductId::new(ids[index]), rating)
            .await;
    }

    let all = ctx.get("/api/products/stats").await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.json["totalProducts"], 4);
    assert_eq!(all.json["totalReviews"], 4);
    assert_eq!(all.json["averageRating"], 3.3);

    let gaming = ctx.get("/api/products/stats?category=Gaming").await;
    assert_eq!(gaming.json["totalProducts"], 2);
    assert_eq!(gaming.json["totalReviews"], 3);
    assert_eq!(gaming.json["averageRating"], 4.0);

    let none = ctx.get("/api/products/stats?search=nothing-matches").await;
    assert_eq!(none.json["totalProducts"], 0);
    assert_eq!(none.json["totalReviews"], 0);
    assert_eq!(none.json["averageRating"], 0.0);
}

#[tokio::test]
async fn test_product_detail_has_full_histogram() {
    let ctx = TestContext::new();
    let product = ctx.add_product("Sony WH-1000XM5", &["Audio"], "349.99").await;
    for rating in [5, 5, 3, 1] {
        ctx.add_review(product.id, rating).await;
    }

    let response = ctx.get(&format!("/api/products/{}", product.id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["name"], "Sony WH-1000XM5");
    assert_eq!(
        response.json["ratingBreakdown"],
        json!({"1": 1, "2": 0, "3": 1, "4": 0, "5": 2})
    );
    assert_eq!(response.json["reviewCount"], 4);
    assert_eq!(response.json["averageRating"], 3.5);
    assert!(response.json.get("aiSummary").is_none());
}

#[tokio::test]
async fn test_product_without_reviews_has_zero_histogram() {
    let ctx = TestContext::new();
    let product = ctx.add_product("Nomad Base One", &["Accessories"], "99.95").await;

    let response = ctx.get(&format!("/api/products/{}", product.id)).await;
    assert_eq!(
        response.json["ratingBreakdown"],
        json!({"1": 0, "2": 0, "3": 0, "4": 0, "5": 0})
    );
    assert_eq!(response.json["averageRating"], 0.0);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let ctx = TestContext::new();
    let response = ctx.get("/api/products/999").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Not found: product 999");

    let bad = ctx.get("/api/products/not-a-number").await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}
