//! HTTP port tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use auth_service_lib::app::new_component_test_application;
use auth_service_lib::http::{create_router, AppState};
use auth_service_lib::token::TokenIssuer;
use domain::CredentialHasher;

const SECRET: &[u8] = b"test-secret-key-for-testing-only-32chars";

fn router() -> (Router, Arc<TokenIssuer>) {
    let issuer = Arc::new(TokenIssuer::new(SECRET));
    let app = new_component_test_application(
        CredentialHasher::new(1024, 1, 1).unwrap(),
        issuer.clone(),
    );
    let state = AppState::new(app, CancellationToken::new());
    (create_router(state, "/metrics"), issuer)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn registration() -> Value {
    json!({ "id": "u1", "email": "a@b.com", "password": "Password1" })
}

#[tokio::test]
async fn test_register_returns_created_with_location() {
    let (router, _) = router();

    let response = router
        .oneshot(post_json("/register", registration()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::CONTENT_LOCATION).unwrap(),
        "/users/u1"
    );
}

#[tokio::test]
async fn test_register_twice_is_conflict() {
    let (router, _) = router();

    router
        .clone()
        .oneshot(post_json("/register", registration()))
        .await
        .unwrap();
    let response = router
        .oneshot(post_json("/register", registration()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["code"], "USER_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_weak_password_is_bad_request() {
    let (router, _) = router();

    let response = router
        .oneshot(post_json(
            "/register",
            json!({ "id": "u1", "email": "a@b.com", "password": "alllettersnodigits" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (router, _) = router();

    let response = router
        .oneshot(post_json("/register", json!({ "id": "u1" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_fetch_profile() {
    let (router, issuer) = router();

    router
        .clone()
        .oneshot(post_json("/register", registration()))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(post_json(
            "/login",
            json!({ "email": "a@b.com", "password": "Password1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["expires_in"].as_i64().unwrap() > 0);
    let token = body["access_token"].as_str().unwrap();
    assert_eq!(issuer.parse(token).unwrap(), "u1");

    let response = router.oneshot(get("/users/u1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], "u1");
    assert_eq!(body["email"], "a@b.com");
    assert!(body.get("created_at").is_some());
    assert!(body.get("password_hash").is_none());
    assert!(body.get("passhash").is_none());
}

#[tokio::test]
async fn test_login_failures_are_unauthorized() {
    let (router, _) = router();

    router
        .clone()
        .oneshot(post_json("/register", registration()))
        .await
        .unwrap();

    for body in [
        json!({ "email": "a@b.com", "password": "wrong1A" }),
        json!({ "email": "nobody@b.com", "password": "Password1" }),
    ] {
        let response = router.clone().oneshot(post_json("/login", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_CREDENTIALS");
    }
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let (router, _) = router();

    let response = router.oneshot(get("/users/ghost")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_health_without_database() {
    let (router, _) = router();

    let response = router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let (router, _) = router();

    let response = router.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
