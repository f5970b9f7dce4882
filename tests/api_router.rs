//! Router tests for authentication and permission gates.
//!
//! The pool and Redis client connect lazily, so these requests are answered
//! before any storage is touched. The one exception is a librarian renewal,
//! which gets as far as the copy lookup.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use bookshelf_server::{
    api,
    config::AppConfig,
    models::user::{AccountType, UserClaims},
    repository::Repository,
    services::{redis::RedisService, Services},
    AppState,
};

fn test_app() -> Router {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    let redis = RedisService::open(&config.redis.url).expect("redis client");
    let services = Services::new(
        Repository::new(pool),
        config.auth.clone(),
        config.catalog.clone(),
        redis,
    );

    api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

fn token_for(account_type: AccountType) -> String {
    let now = Utc::now().timestamp();
    let claims = UserClaims {
        sub: "tester".to_string(),
        user_id: 42,
        account_type,
        permissions: account_type.permissions(),
        exp: now + 3600,
        iat: now,
    };
    claims
        .create_token(&AppConfig::default().auth.jwt_secret)
        .expect("token")
}

fn raw_json_request(uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_health_check() {
    let response = test_app()
        .oneshot(request(Method::GET, "/api/v1/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_borrowed_listing_requires_login() {
    let response = test_app()
        .oneshot(request(Method::GET, "/api/v1/borrowed", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "NotAuthenticated");
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let response = test_app()
        .oneshot(request(Method::GET, "/api/v1/mybooks", Some("not-a-jwt"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reader_cannot_list_all_borrowed() {
    let token = token_for(AccountType::Reader);
    let response = test_app()
        .oneshot(request(Method::GET, "/api/v1/borrowed", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reader_cannot_open_renewal_form() {
    let token = token_for(AccountType::Reader);
    let uri = format!("/api/v1/book/{}/renew", Uuid::new_v4());
    let response = test_app()
        .oneshot(request(Method::GET, &uri, Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reader_cannot_submit_renewal() {
    let token = token_for(AccountType::Reader);
    let uri = format!("/api/v1/book/{}/renew", Uuid::new_v4());
    let today = chrono::Local::now().date_naive();
    let response = test_app()
        .oneshot(request(
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({ "renewal_date": today.to_string() })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "NotAuthorized");
}

#[tokio::test]
async fn test_renewal_without_login_is_unauthorized() {
    let uri = format!("/api/v1/book/{}/renew", Uuid::new_v4());
    let response = test_app()
        .oneshot(request(Method::GET, &uri, None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reader_cannot_create_book() {
    let token = token_for(AccountType::Reader);
    let response = test_app()
        .oneshot(request(
            Method::POST,
            "/api/v1/books",
            Some(&token),
            Some(json!({
                "title": "Foundation",
                "summary": "",
                "isbn": "9780553293357"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_librarian_cannot_manage_users() {
    let token = token_for(AccountType::Librarian);
    let response = test_app()
        .oneshot(request(Method::GET, "/api/v1/users", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_page_zero_is_not_found() {
    let response = test_app()
        .oneshot(request(Method::GET, "/api/v1/books?page=0", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_huge_page_is_not_found() {
    let response = test_app()
        .oneshot(request(
            Method::GET,
            "/api/v1/books?page=9223372036854775807",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "NoSuchRecord");
}

#[tokio::test]
async fn test_reader_with_unreadable_renewal_is_forbidden() {
    let token = token_for(AccountType::Reader);
    let uri = format!("/api/v1/book/{}/renew", Uuid::new_v4());

    for body in [r#"{"renewal_date": "garbage"}"#, "{}", "not json"] {
        let response = test_app()
            .oneshot(raw_json_request(&uri, &token, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "body {:?}", body);
    }
}

#[tokio::test]
async fn test_reader_renewal_without_body_is_forbidden() {
    let token = token_for(AccountType::Reader);
    let uri = format!("/api/v1/book/{}/renew", Uuid::new_v4());
    let response = test_app()
        .oneshot(request(Method::POST, &uri, Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_librarian_unreadable_renewal_date_is_not_rejected_by_extractor() {
    let token = token_for(AccountType::Librarian);
    let uri = format!("/api/v1/book/{}/renew", Uuid::new_v4());

    for body in [r#"{"renewal_date": "31/12/2026"}"#, "{}"] {
        let response = test_app()
            .oneshot(raw_json_request(&uri, &token, body))
            .await
            .unwrap();

        // The submission reaches the renewal handling, which looks the copy up
        assert_ne!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "body {:?}", body);
        assert_ne!(response.status(), StatusCode::FORBIDDEN, "body {:?}", body);
        let body = body_json(response).await;
        assert!(body["error"].is_string() || body["errors"].is_array());
    }
}
