//! Integration tests for the auth routes and session lifecycle.

#[path = "../common/mod.rs"]
mod common;

use agentdesk_api::routes::auth::SessionMetadata;
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
async fn test_login_redirects_to_identity_provider() {
    let state = common::test_state();
    let server = common::test_server(state);

    let response = server.get("/auth/login").await;
    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);

    let location = response.header("location");
    let location = location.to_str().unwrap();
    assert!(location.contains("/authorize?"));
    assert!(location.contains("response_type=code"));
    assert!(location.contains("state="));
}

#[tokio::test]
async fn test_callback_requires_code_and_known_state() {
    let state = common::test_state();
    let server = common::test_server(state);

    let response = server.get("/auth/callback").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // A state value the server never issued is rejected
    let response = server
        .get("/auth/callback?code=abc&state=not-issued")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_unauthenticated() {
    let state = common::test_state();
    let server = common::test_server(state);

    let response = server.get("/auth/status").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["authenticated"], false);
    assert!(body.get("email").is_none());
}

#[tokio::test]
async fn test_status_with_live_session() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state);
    let (name, value) = common::auth_header(&token);

    let response = server.get("/auth/status").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["email"], "owner@example.com");
    assert!(body["token_expires_at"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_refresh_issues_new_token_pair() {
    let state = common::test_state();
    let (profile, _token) = common::signed_in_user(&state, "owner@example.com").await;

    // Issue a pair whose session we control
    let session_id = Uuid::new_v4().to_string();
    let tokens = state
        .jwt_service
        .generate_token_pair(&profile.email, profile.id, &session_id)
        .unwrap();
    state.session_store.lock().await.insert(
        session_id,
        SessionMetadata {
            user_id: profile.id,
            email: profile.email.clone(),
            created_at: chrono::Utc::now(),
            last_activity: chrono::Utc::now(),
        },
    );

    let server = common::test_server(state);
    let response = server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": tokens.refresh_token }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["access_token"].as_str().unwrap().len() > 20);
    assert!(body["refresh_token"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn test_refresh_rejects_garbage_and_access_tokens() {
    let state = common::test_state();
    let (_profile, access_token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state);

    let response = server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": "not-a-token" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    // An access token is not usable as a refresh token
    let response = server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": access_token }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rejects_dead_session() {
    let state = common::test_state();
    let (profile, _token) = common::signed_in_user(&state, "owner@example.com").await;

    // Valid pair, but its session was never stored
    let tokens = state
        .jwt_service
        .generate_token_pair(&profile.email, profile.id, "ghost-session")
        .unwrap();

    let server = common::test_server(state);
    let response = server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": tokens.refresh_token }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state);
    let (name, value) = common::auth_header(&token);

    // Token works before logout
    let response = server
        .get("/agents")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .post("/auth/logout")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    // Same token is now rejected everywhere
    let response = server
        .get("/agents")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server.get("/auth/status").add_header(name, value).await;
    let body: Value = response.json();
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_protected_route_rejects_token_without_session() {
    let state = common::test_state();
    let tokens = state
        .jwt_service
        .generate_token_pair("nobody@example.com", Uuid::new_v4(), "never-stored")
        .unwrap();
    let server = common::test_server(state);
    let (name, value) = common::auth_header(&tokens.access_token);

    let response = server.get("/agents").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
