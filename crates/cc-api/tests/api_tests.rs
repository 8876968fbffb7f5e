//! API integration tests.
//!
//! These exercise the HTTP surface that does not need a live document
//! store: health, middleware behavior, and the error envelope.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;

use cc_api::error::ApiError;
use cc_api::handlers::health;
use cc_api::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};

fn test_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/boom",
            get(|| async { Err::<(), ApiError>(ApiError::not_found("Job not found")) }),
        )
        .layer(from_fn(security_headers))
        .layer(from_fn(request_id))
        .layer(from_fn(request_logging))
        .layer(cors_layer(&["*".to_string()]))
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let app = test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn security_headers_are_set() {
    let app = test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert!(headers.contains_key("X-Content-Type-Options"));
    assert!(headers.contains_key("X-Frame-Options"));
    assert!(headers.contains_key("X-Request-ID"));
}

#[tokio::test]
async fn request_id_is_preserved_when_supplied() {
    let app = test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "test-request-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("X-Request-ID").unwrap(),
        "test-request-42"
    );
}

#[tokio::test]
async fn cors_preflight_succeeds() {
    let app = test_router();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .header("Access-Control-Request-Method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::OK || response.status() == StatusCode::NO_CONTENT
    );
}

#[tokio::test]
async fn errors_use_the_failure_envelope() {
    let app = test_router();

    let response = app
        .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Job not found");
}

#[tokio::test]
async fn rate_limiter_returns_429_after_quota() {
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(1));

    let app = Router::new()
        .route("/limited", get(|| async { "ok" }))
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/limited")
                .header("X-Forwarded-For", "192.168.1.100")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(
            Request::builder()
                .uri("/limited")
                .header("X-Forwarded-For", "192.168.1.100")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key("Retry-After"));
}
