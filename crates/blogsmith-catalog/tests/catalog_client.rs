//! Integration tests for `CatalogClient` against a local wiremock server.
//!
//! Covers the happy paths (empty, single-page, multi-page feeds) and the
//! error variants a feed fetch can surface, including retry behavior.

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use blogsmith_catalog::{CatalogClient, CatalogError};

/// 5-second timeout, no retries.
fn test_client() -> CatalogClient {
    CatalogClient::new(5, "blogsmith-test/0.1", 0, 0).expect("failed to build test CatalogClient")
}

fn test_client_with_retries(max_retries: u32) -> CatalogClient {
    CatalogClient::new(5, "blogsmith-test/0.1", max_retries, 0)
        .expect("failed to build test CatalogClient")
}

/// One-product feed page fixture.
fn one_product_json(id: i64) -> serde_json::Value {
    json!({
        "products": [{
            "id": id,
            "title": format!("Product {id}"),
            "handle": format!("product-{id}"),
            "product_type": "Planters",
            "tags": ["outdoor"],
            "vendor": "GroveWorks",
            "variants": [
                {"id": id * 10, "title": "Default", "price": "49.00", "position": 1}
            ],
            "metafields": {
                "smart_length": 120,
                "smart_length_unit": "cm"
            }
        }]
    })
}

#[tokio::test]
async fn empty_feed_yields_an_empty_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"products": []})))
        .mount(&server)
        .await;

    let catalog = test_client()
        .fetch_catalog(&server.uri(), 250, 0)
        .await
        .expect("empty feed should fetch cleanly");

    assert!(catalog.is_empty());
}

#[tokio::test]
async fn single_page_catalog_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&one_product_json(1)))
        .mount(&server)
        .await;

    let catalog = test_client()
        .fetch_catalog(&server.uri(), 250, 0)
        .await
        .expect("single page should fetch cleanly");

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].source_product_id, "1");
    assert_eq!(catalog[0].title, "Product 1");
    assert_eq!(catalog[0].price.map(|p| p.to_string()), Some("49.00".into()));
    assert_eq!(catalog[0].attributes.length.as_deref(), Some("120"));
    assert_eq!(catalog[0].attributes.length_unit.as_deref(), Some("cm"));
}

#[tokio::test]
async fn link_cursors_are_followed_across_pages() {
    let server = MockServer::start().await;

    let next_link = format!(
        "<{base}/products.json?limit=250&page_info=cursor2>; rel=\"next\"",
        base = server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param_is_missing("page_info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&one_product_json(1))
                .insert_header("Link", next_link.as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page_info", "cursor2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&one_product_json(2)))
        .mount(&server)
        .await;

    let catalog = test_client()
        .fetch_catalog(&server.uri(), 250, 0)
        .await
        .expect("two-page feed should fetch cleanly");

    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[0].source_product_id, "1");
    assert_eq!(catalog[1].source_product_id, "2");
}

#[tokio::test]
async fn missing_feed_surfaces_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_catalog(&server.uri(), 250, 0)
        .await
        .expect_err("404 should be an error");

    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn rate_limit_is_retried_until_success() {
    let server = MockServer::start().await;

    // First request gets a 429, subsequent requests succeed.
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&one_product_json(1)))
        .mount(&server)
        .await;

    let catalog = test_client_with_retries(2)
        .fetch_catalog(&server.uri(), 250, 0)
        .await
        .expect("429 then 200 should succeed after retry");

    assert_eq!(catalog.len(), 1);
}

#[tokio::test]
async fn rate_limit_error_after_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "120"))
        .mount(&server)
        .await;

    let err = test_client_with_retries(1)
        .fetch_catalog(&server.uri(), 250, 0)
        .await
        .expect_err("permanent 429 should exhaust retries");

    match err {
        CatalogError::RateLimited {
            retry_after_secs, ..
        } => assert_eq!(retry_after_secs, 120),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>not json"))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_catalog(&server.uri(), 250, 0)
        .await
        .expect_err("HTML body should fail to parse");

    assert!(matches!(err, CatalogError::Deserialize { .. }));
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_with_retries(3)
        .fetch_catalog(&server.uri(), 250, 0)
        .await
        .expect_err("500 should be an error");

    assert!(matches!(
        err,
        CatalogError::UnexpectedStatus { status: 500, .. }
    ));
}
