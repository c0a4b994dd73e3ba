//! API integration tests against a running server
//!
//! Start the server with `BOOKSTORE_DATABASE__URL=memory://` or against a
//! seeded database, then run `cargo test --test api_tests -- --ignored`.

use reqwest::Client;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080/api/v1";

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books?page=1", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
    assert_eq!(body["currentPage"], 1);
    assert!(body["lastPage"].is_boolean());
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_book() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books/2147483647/borrow", BASE_URL))
        .header("Cookie", "id=9")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errorMessage"], "Book not found.");
}

#[tokio::test]
#[ignore]
async fn test_my_books_page_beyond_end() {
    let client = Client::new();

    let response = client
        .get(format!("{}/my-books?page=10000", BASE_URL))
        .header("Cookie", "id=9")
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["books"].as_array().map(|b| b.len()), Some(0));
    assert_eq!(body["lastPage"], true);
}

#[tokio::test]
#[ignore]
async fn test_missing_customer_cookie() {
    let client = Client::new();

    let response = client
        .get(format!("{}/my-books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
