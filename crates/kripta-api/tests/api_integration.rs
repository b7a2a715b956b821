//! API 라우터 통합 테스트
//!
//! 데이터베이스 없이 구성한 상태로 인증, 에러 코드, 공개 endpoint 동작을 확인합니다.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use kripta_api::auth::{create_token, Claims};
use kripta_api::routes::create_api_router;
use kripta_api::state::{create_test_state, TEST_JWT_SECRET};
use kripta_core::Role;
use serde_json::Value;
use tower::ServiceExt;

fn app() -> Router {
    create_api_router().with_state(Arc::new(create_test_state()))
}

fn token(expires_in_minutes: i64) -> String {
    let claims = Claims::new("open-id-1", Role::User, expires_in_minutes)
        .with_name("Alice")
        .with_email("alice@example.com");
    create_token(&claims, TEST_JWT_SECRET).unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let (status, body) = send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_readiness_reports_missing_database() {
    let (status, body) = send(get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"]["database"]["status"], "not_configured");
}

#[tokio::test]
async fn test_me_without_session_is_null() {
    let (status, body) = send(get("/api/v1/auth/me")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/logout")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("kripta_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    for uri in [
        "/api/v1/wallet",
        "/api/v1/wallet/portfolio",
        "/api/v1/trading/orders",
        "/api/v1/transactions",
        "/api/v1/analytics/portfolio-metrics",
        "/api/v1/analytics/value-history?daysBack=7",
    ] {
        let (status, body) = send(get(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["code"], "MISSING_TOKEN", "{uri}");
    }
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let request = Request::builder()
        .uri("/api/v1/wallet")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(-10)))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_valid_bearer_without_database_is_unavailable() {
    let request = Request::builder()
        .uri("/api/v1/trading/orders")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(60)))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "DB_UNAVAILABLE");
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let request = Request::builder()
        .uri("/api/v1/transactions?limit=10")
        .header(header::COOKIE, format!("theme=dark; kripta_session={}", token(60)))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "DB_UNAVAILABLE");
}

#[tokio::test]
async fn test_market_routes_are_public() {
    let (status, body) = send(get("/api/v1/market/cryptocurrencies")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "DB_UNAVAILABLE");

    let (status, _) = send(get("/api/v1/market/data/1")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_admin_route_rejects_anonymous() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/market/cryptocurrencies")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"symbol":"BTC","name":"Bitcoin","coinGeckoId":"bitcoin"}"#))
        .unwrap();

    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _) = send(get("/api/v1/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
