//! Integration tests for the browser gateway middleware.

#[path = "../common/mod.rs"]
mod common;

use agentdesk_api::middleware::gateway::gateway_middleware;
use agentdesk_api::routes::AppState;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::{Router, middleware, routing::get};
use axum_test::TestServer;

/// Page router with the gateway in front, like the production binary.
fn page_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/", get(|| async { "home" }))
        .route("/login", get(|| async { "login page" }))
        .route("/signup", get(|| async { "signup page" }))
        .route("/dashboard", get(|| async { "dashboard" }))
        .route("/dashboard/reports", get(|| async { "reports" }))
        .route("/billing", get(|| async { "billing page" }))
        .route("/api/ping", get(|| async { "pong" }))
        .layer(middleware::from_fn_with_state(state, gateway_middleware));
    TestServer::new(app).unwrap()
}

fn cookie_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("cookie"),
        HeaderValue::from_str(&format!("access-token={}", token)).unwrap(),
    )
}

#[tokio::test]
async fn test_unauthenticated_protected_page_redirects_to_login() {
    let state = common::test_state();
    let server = page_server(state);

    for path in ["/dashboard", "/dashboard/reports", "/billing"] {
        let response = server.get(path).await;
        assert_eq!(
            response.status_code(),
            StatusCode::TEMPORARY_REDIRECT,
            "{} should redirect",
            path
        );
        assert_eq!(response.header("location").to_str().unwrap(), "/login");
    }
}

#[tokio::test]
async fn test_authenticated_bearer_reaches_protected_page() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = page_server(state);
    let (name, value) = common::auth_header(&token);

    let response = server.get("/dashboard").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "dashboard");
}

#[tokio::test]
async fn test_authenticated_cookie_reaches_protected_page() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = page_server(state);
    let (name, value) = cookie_header(&token);

    let response = server.get("/dashboard").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_authenticated_login_page_redirects_to_dashboard() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = page_server(state);

    for path in ["/login", "/signup"] {
        let (name, value) = common::auth_header(&token);
        let response = server.get(path).add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.header("location").to_str().unwrap(), "/dashboard");
    }
}

#[tokio::test]
async fn test_unauthenticated_login_page_passes_through() {
    let state = common::test_state();
    let server = page_server(state);

    let response = server.get("/login").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "login page");
}

#[tokio::test]
async fn test_api_paths_are_exempt_from_redirects() {
    let state = common::test_state();
    let server = page_server(state);

    let response = server.get("/api/ping").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "pong");
}

#[tokio::test]
async fn test_unlisted_pages_are_untouched() {
    let state = common::test_state();
    let server = page_server(state);

    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_token_counts_as_unauthenticated() {
    let state = common::test_state();
    let server = page_server(state);
    let (name, value) = common::auth_header("garbage-token");

    let response = server.get("/dashboard").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location").to_str().unwrap(), "/login");
}

#[tokio::test]
async fn test_revoked_session_is_redirected() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;

    // Revoke every live session
    let session_ids: Vec<String> = state.session_store.lock().await.keys().cloned().collect();
    for id in session_ids {
        state.revoked_tokens.lock().await.insert(id);
    }

    let server = page_server(state);
    let (name, value) = common::auth_header(&token);
    let response = server.get("/dashboard").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
}
