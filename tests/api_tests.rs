//! API integration tests
//!
//! These run against a live server started with the bootstrap admin password
//! set to "admin" (`BOOKSHELF_AUTH__ADMIN_PASSWORD=admin`).

use chrono::{Duration, Local};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in as the bootstrap admin, returns (token, user id)
async fn login_admin(client: &Client) -> (String, i64) {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    let user_id = body["user"]["id"].as_i64().expect("No user id in response");
    (token, user_id)
}

async fn post_json(client: &Client, token: &str, path: &str, payload: Value) -> Value {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED, "POST {} failed", path);
    response.json().await.expect("Failed to parse response")
}

/// Create a book with a copy on loan to `borrower_id`, returns the copy id
async fn create_loaned_copy(client: &Client, token: &str, borrower_id: i64) -> String {
    let author = post_json(
        client,
        token,
        "/authors",
        json!({ "first_name": "Ursula", "last_name": "Le Guin" }),
    )
    .await;

    let book = post_json(
        client,
        token,
        "/books",
        json!({
            "title": "A Wizard of Earthsea",
            "summary": "A young mage's first journey.",
            "isbn": "9780547773742",
            "author_id": author["id"],
            "genre_ids": []
        }),
    )
    .await;

    let due_back = Local::now().date_naive() + Duration::days(3);
    let copy = post_json(
        client,
        token,
        "/book-instances",
        json!({
            "book_id": book["id"],
            "imprint": "Houghton Mifflin, 2012",
            "due_back": due_back.to_string(),
            "status": "on_loan",
            "borrower_id": borrower_id
        }),
    )
    .await;

    copy["id"].as_str().expect("No copy id").to_string()
}

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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_index_counts_visits() {
    let client = Client::new();
    let (token, _) = login_admin(&client).await;

    let first: Value = client
        .get(format!("{}/", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let second: Value = client
        .get(format!("{}/", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert!(first["num_books"].is_number());
    assert_eq!(
        second["num_visits"].as_i64().unwrap(),
        first["num_visits"].as_i64().unwrap() + 1
    );
}

#[tokio::test]
#[ignore]
async fn test_page_sizes() {
    let client = Client::new();
    let (token, user_id) = login_admin(&client).await;
    create_loaned_copy(&client, &token, user_id).await;

    let books: Value = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(books["per_page"], 3);
    assert!(books["items"].as_array().unwrap().len() <= 3);

    let authors: Value = client
        .get(format!("{}/authors", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(authors["per_page"], 3);

    let borrowed: Value = client
        .get(format!("{}/borrowed", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(borrowed["per_page"], 10);
    assert!(borrowed["items"].as_array().unwrap().len() <= 10);
}

#[tokio::test]
#[ignore]
async fn test_page_past_end_not_found() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books?page=100000", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_renewal_form_proposes_three_weeks() {
    let client = Client::new();
    let (token, user_id) = login_admin(&client).await;
    let copy_id = create_loaned_copy(&client, &token, user_id).await;

    let response = client
        .get(format!("{}/book/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let proposed = Local::now().date_naive() + Duration::weeks(3);
    assert_eq!(body["renewal_date"], proposed.to_string());
    assert_eq!(body["book_instance"]["id"], copy_id.as_str());
}

#[tokio::test]
#[ignore]
async fn test_renewal_redirects_to_borrowed_list() {
    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client");
    let (token, user_id) = login_admin(&client).await;
    let copy_id = create_loaned_copy(&client, &token, user_id).await;

    let renewal_date = Local::now().date_naive() + Duration::weeks(2);
    let response = client
        .post(format!("{}/book/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": renewal_date.to_string() }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()["location"].to_str().unwrap(),
        "/api/v1/borrowed"
    );

    let copy: Value = client
        .get(format!("{}/book-instances/{}", BASE_URL, copy_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(copy["due_back"], renewal_date.to_string());
}

#[tokio::test]
#[ignore]
async fn test_renewal_in_past_rejected() {
    let client = Client::new();
    let (token, user_id) = login_admin(&client).await;
    let copy_id = create_loaned_copy(&client, &token, user_id).await;

    let yesterday = Local::now().date_naive() - Duration::days(1);
    let response = client
        .post(format!("{}/book/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": yesterday.to_string() }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Invalid date - renewal in past");
    assert_eq!(body["renewal_date"], yesterday.to_string());
}

#[tokio::test]
#[ignore]
async fn test_renewal_too_far_ahead_rejected() {
    let client = Client::new();
    let (token, user_id) = login_admin(&client).await;
    let copy_id = create_loaned_copy(&client, &token, user_id).await;

    let too_late = Local::now().date_naive() + Duration::weeks(4) + Duration::days(1);
    let response = client
        .post(format!("{}/book/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": too_late.to_string() }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Invalid date - renewal more than 4 weeks ahead");
}

#[tokio::test]
#[ignore]
async fn test_renewal_unknown_copy_not_found() {
    let client = Client::new();
    let (token, _) = login_admin(&client).await;

    let response = client
        .get(format!("{}/book/{}/renew", BASE_URL, uuid::Uuid::new_v4()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
