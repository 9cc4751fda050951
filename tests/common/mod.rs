//! Shared helpers for integration tests.
//!
//! Builds the API router around the in-memory storage backend and a fixed
//! JWT secret so tests never touch the environment or a real database.

#![allow(dead_code)]

use std::sync::Arc;

use agentdesk_api::models::Profile;
use agentdesk_api::routes::auth::SessionMetadata;
use agentdesk_api::routes::{AppState, create_api_router};
use agentdesk_api::services::jwt_service::JwtService;
use agentdesk_api::storage::MemoryStorageBackend;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-key-0123456789abcdef";

/// AppState backed by in-memory storage and a fixed JWT secret.
pub fn test_state() -> AppState {
    AppState::with_backend(
        Arc::new(MemoryStorageBackend::new()),
        Arc::new(JwtService::new(TEST_JWT_SECRET)),
    )
}

/// Test server over the full API router.
pub fn test_server(state: AppState) -> TestServer {
    let app = create_api_router(state.clone()).with_state(state);
    TestServer::new(app).unwrap()
}

/// Create a profile with a live session. Returns the profile and the raw
/// access token for `authorization_bearer`.
pub async fn signed_in_user(state: &AppState, email: &str) -> (Profile, String) {
    let profile = state
        .storage
        .create_profile(Profile::new(email.to_string(), format!("prov-{}", email)))
        .await
        .unwrap();

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

    (profile, tokens.access_token)
}

/// Authorization header pair for `add_header`.
pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}
