//! Integration tests for the catalog endpoints.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use ethereal_cart_integration_tests::{TestApp, dec};

fn app() -> TestApp {
    TestApp::in_memory().0
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_health() {
    let resp = app().get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text, "ok");
}

#[tokio::test]
async fn test_default_listing_puts_featured_first() {
    let resp = app().get("/products").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.product_ids(),
        vec!["1", "2", "3", "4", "5", "6", "7", "8"]
    );
    assert_eq!(resp.body["total"], 8);
}

#[tokio::test]
async fn test_in_stock_filter() {
    let resp = app().get("/products?inStock=true").await;
    assert_eq!(resp.status, StatusCode::OK);

    let ids = resp.product_ids();
    assert!(!ids.contains(&"7".to_string()));
    assert_eq!(ids.len(), 7);
    assert!(
        resp.body["products"]
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["inStock"] == true)
    );
}

#[tokio::test]
async fn test_price_range_is_inclusive() {
    let resp = app()
        .get("/products?minPrice=129.99&maxPrice=199.99&sort=price-low")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.product_ids(), vec!["7", "3", "2", "5"]);
}

#[tokio::test]
async fn test_inverted_price_range_is_bad_request() {
    let resp = app().get("/products?minPrice=200&maxPrice=100").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body["error"].as_str().unwrap().contains("minPrice"));
}

#[tokio::test]
async fn test_category_filter() {
    let resp = app().get("/products?category=sports").await;
    assert_eq!(resp.product_ids(), vec!["5", "8"]);
}

#[tokio::test]
async fn test_unknown_category_is_empty_not_error() {
    let resp = app().get("/products?category=toys").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.product_ids().is_empty());
    assert_eq!(resp.body["total"], 0);
}

#[tokio::test]
async fn test_search_matches_tags_case_insensitively() {
    let resp = app().get("/products?search=WIRELESS").await;
    assert_eq!(resp.product_ids(), vec!["1", "7"]);
}

#[tokio::test]
async fn test_combined_filters() {
    let resp = app()
        .get("/products?category=electronics&inStock=true&search=wireless")
        .await;
    assert_eq!(resp.product_ids(), vec!["1"]);
}

// =============================================================================
// Sorting
// =============================================================================

#[tokio::test]
async fn test_sort_price_high_reverses_price_low() {
    let app = app();
    let low = app.get("/products?sort=price-low").await.product_ids();
    let mut high = app.get("/products?sort=price-high").await.product_ids();
    high.reverse();
    assert_eq!(low, high);
}

#[tokio::test]
async fn test_sort_price_low_is_non_decreasing() {
    let resp = app().get("/products?sort=price-low").await;
    let prices: Vec<_> = resp.body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| dec(&p["price"]))
        .collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_sort_rating_is_stable() {
    let resp = app().get("/products?sort=rating").await;
    assert_eq!(
        resp.product_ids(),
        vec!["2", "4", "1", "6", "3", "5", "7", "8"]
    );
}

#[tokio::test]
async fn test_sort_newest() {
    let resp = app().get("/products?sort=newest").await;
    assert_eq!(
        resp.product_ids(),
        vec!["8", "7", "6", "5", "4", "3", "2", "1"]
    );
}

#[tokio::test]
async fn test_unknown_sort_is_rejected() {
    let resp = app().get("/products?sort=cheapest").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_detail_includes_discount() {
    let resp = app().get("/products/1").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["name"], "Ethereal Wireless Headphones");
    assert_eq!(resp.body["discountPercentage"], 25);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let resp = app().get("/products/999").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.body["error"].is_string());
}

#[tokio::test]
async fn test_featured_products() {
    let resp = app().get("/products/featured").await;
    assert_eq!(resp.product_ids(), vec!["1", "2", "3", "4"]);
}

#[tokio::test]
async fn test_related_products_share_category_and_unknown_is_empty() {
    let app = app();
    let resp = app.get("/products/1/related").await;
    assert_eq!(resp.product_ids(), vec!["7"]);

    let missing = app.get("/products/999/related").await;
    assert_eq!(missing.status, StatusCode::OK);
    assert!(missing.product_ids().is_empty());
    assert_eq!(missing.body["total"], 0);
}

#[tokio::test]
async fn test_search_suggestions() {
    let app = app();
    let resp = app.get("/products/search?q=lamp").await;
    assert_eq!(resp.product_ids(), vec!["3"]);

    let blank = app.get("/products/search?q=").await;
    assert!(blank.product_ids().is_empty());

    let broad = app.get("/products/search?q=e").await;
    assert!(broad.product_ids().len() <= 5);
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_category_listing_counts_products() {
    let resp = app().get("/categories").await;
    assert_eq!(resp.status, StatusCode::OK);

    let categories = resp.body.as_array().unwrap();
    assert_eq!(categories.len(), 6);
    assert_eq!(categories[0]["slug"], "electronics");
    assert_eq!(categories[0]["productCount"], 2);
}

#[tokio::test]
async fn test_category_detail() {
    let app = app();
    let resp = app.get("/categories/sports").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["category"]["name"], "Sports");
    assert_eq!(resp.product_ids(), vec!["5", "8"]);

    let missing = app.get("/categories/toys").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
