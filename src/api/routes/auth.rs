//! Authentication routes.
//!
//! The identity provider owns credentials; this API only redirects to its
//! hosted authorize page and exchanges the callback code for a session.
//!
//! Security features:
//! - Time-scoped JWT access tokens (15 minutes)
//! - Refresh tokens for session renewal (7 days)
//! - Session revocation support via blacklist

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Json, Redirect},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use super::app_state::AppState;
use crate::models::Profile;
use crate::services::jwt_service::{Claims, JwtService};

/// Session storage - keeps track of active sessions for revocation.
/// Key: session_id (from JWT), Value: session metadata
pub type SessionStore = Arc<Mutex<HashMap<String, SessionMetadata>>>;

/// Revoked sessions (for logout before token expiry)
pub type RevokedTokens = Arc<Mutex<HashSet<String>>>;

/// Outstanding OAuth-style `state` values awaiting a callback (CSRF check)
pub type PendingStateStore = Arc<Mutex<HashMap<String, chrono::DateTime<chrono::Utc>>>>;

/// Session metadata stored server-side (for revocation and tracking)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub user_id: Uuid,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_activity: chrono::DateTime<chrono::Utc>,
}

pub fn new_session_store() -> SessionStore {
    Arc::new(Mutex::new(HashMap::new()))
}

pub fn new_revoked_tokens() -> RevokedTokens {
    Arc::new(Mutex::new(HashSet::new()))
}

pub fn new_pending_state_store() -> PendingStateStore {
    Arc::new(Mutex::new(HashMap::new()))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthStatusResponse {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_expires_at: Option<i64>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RefreshTokenRequest {
    refresh_token: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RefreshTokenResponse {
    access_token: String,
    refresh_token: String,
    access_token_expires_at: i64,
    refresh_token_expires_at: i64,
    token_type: String,
}

/// Auth router state
#[derive(Clone)]
pub struct AuthState {
    pub pending_states: PendingStateStore,
    pub app_state: AppState,
}

/// Create the auth router
pub fn auth_router(app_state: AppState) -> Router<AppState> {
    let auth_state = AuthState {
        pending_states: new_pending_state_store(),
        app_state,
    };

    Router::new()
        .route("/login", get(initiate_login))
        .route("/callback", get(handle_callback))
        .route("/refresh", post(refresh_token))
        .route("/status", get(get_auth_status))
        .route("/logout", post(logout))
        .with_state(auth_state)
}

/// GET /auth/login - Redirect to the identity provider's authorize page
#[utoipa::path(
    get,
    path = "/auth/login",
    tag = "Auth",
    responses(
        (status = 307, description = "Redirect to the identity provider")
    )
)]
pub async fn initiate_login(State(auth_state): State<AuthState>) -> Redirect {
    let state = Uuid::new_v4().to_string();
    auth_state
        .pending_states
        .lock()
        .await
        .insert(state.clone(), chrono::Utc::now());

    let url = auth_state.app_state.identity_service.authorize_url(&state);
    info!("Initiating login via identity provider");
    Redirect::temporary(&url)
}

/// GET /auth/callback - Exchange the authorization code for a session
#[utoipa::path(
    get,
    path = "/auth/callback",
    tag = "Auth",
    params(
        ("code" = String, Query, description = "Authorization code from the identity provider"),
        ("state" = String, Query, description = "CSRF state issued at login")
    ),
    responses(
        (status = 307, description = "Redirect to the frontend with tokens"),
        (status = 400, description = "Missing code or unknown state"),
        (status = 500, description = "Provider exchange failed")
    )
)]
pub async fn handle_callback(
    State(auth_state): State<AuthState>,
    Query(params): Query<CallbackQuery>,
) -> Result<Redirect, StatusCode> {
    let code = match params.code.as_ref() {
        Some(c) if !c.is_empty() => c.as_str(),
        _ => return Err(StatusCode::BAD_REQUEST),
    };

    // The state must be one we issued
    if let Some(state) = params.state.as_deref() {
        if auth_state.pending_states.lock().await.remove(state).is_none() {
            warn!("Callback received with unknown state");
            return Err(StatusCode::BAD_REQUEST);
        }
    } else {
        return Err(StatusCode::BAD_REQUEST);
    }

    let app_state = &auth_state.app_state;

    // Exchange code for a provider access token
    let provider_token = match app_state.identity_service.exchange_code(code).await {
        Ok(token) => token,
        Err(e) => {
            warn!("Failed to exchange authorization code: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    // Fetch the user record from the provider
    let provider_user = match app_state.identity_service.fetch_user(&provider_token).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Failed to fetch user from identity provider: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Ensure an application profile exists for this provider identity
    let profile = match app_state
        .storage
        .get_profile_by_provider_id(&provider_user.id)
        .await
    {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            let mut profile = Profile::new(provider_user.email.clone(), provider_user.id.clone());
            profile.display_name = provider_user.name.clone();
            match app_state.storage.create_profile(profile).await {
                Ok(profile) => profile,
                Err(e) => {
                    warn!("Failed to create profile: {}", e);
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        }
        Err(e) => {
            warn!("Failed to look up profile: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Generate session ID and JWT tokens
    let session_id = Uuid::new_v4().to_string();
    let tokens = app_state
        .jwt_service
        .generate_token_pair(&profile.email, profile.id, &session_id)
        .map_err(|e| {
            warn!("Failed to generate JWT tokens: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    // Store session metadata
    let session = SessionMetadata {
        user_id: profile.id,
        email: profile.email.clone(),
        created_at: chrono::Utc::now(),
        last_activity: chrono::Utc::now(),
    };
    app_state
        .session_store
        .lock()
        .await
        .insert(session_id.clone(), session);

    info!(
        "Created session for user {} (session: {})",
        profile.email, session_id
    );

    let frontend_url =
        std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

    // Tokens travel in the redirect URL and land in the frontend's storage
    let encoded_token = urlencoding::encode(&tokens.access_token);
    let encoded_refresh = urlencoding::encode(&tokens.refresh_token);
    let redirect_url = format!(
        "{}/auth/complete/{}/{}/{}",
        frontend_url, encoded_token, encoded_refresh, tokens.access_token_expires_at
    );
    Ok(Redirect::temporary(&redirect_url))
}

/// POST /auth/refresh - Refresh access token using refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "New token pair"),
        (status = 401, description = "Invalid, revoked, or expired refresh token")
    )
)]
pub async fn refresh_token(
    State(auth_state): State<AuthState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, StatusCode> {
    let app_state = &auth_state.app_state;

    let claims = app_state
        .jwt_service
        .validate_refresh_token(&request.refresh_token)
        .map_err(|e| {
            warn!("Invalid refresh token: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

    // Check if session is revoked
    let revoked = app_state.revoked_tokens.lock().await;
    if revoked.contains(&claims.session_id) {
        warn!("Attempted to refresh revoked session: {}", claims.session_id);
        return Err(StatusCode::UNAUTHORIZED);
    }
    drop(revoked);

    // Check if session still exists
    let sessions = app_state.session_store.lock().await;
    if !sessions.contains_key(&claims.session_id) {
        warn!("Session not found for refresh: {}", claims.session_id);
        return Err(StatusCode::UNAUTHORIZED);
    }
    drop(sessions);

    let new_tokens = app_state
        .jwt_service
        .refresh_access_token(&request.refresh_token)
        .map_err(|e| {
            warn!("Failed to refresh token: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    // Update last activity
    let mut sessions = app_state.session_store.lock().await;
    if let Some(session) = sessions.get_mut(&claims.session_id) {
        session.last_activity = chrono::Utc::now();
    }

    info!("Refreshed tokens for session: {}", claims.session_id);

    Ok(Json(RefreshTokenResponse {
        access_token: new_tokens.access_token,
        refresh_token: new_tokens.refresh_token,
        access_token_expires_at: new_tokens.access_token_expires_at,
        refresh_token_expires_at: new_tokens.refresh_token_expires_at,
        token_type: "Bearer".to_string(),
    }))
}

/// GET /auth/status - Get current authentication status
#[utoipa::path(
    get,
    path = "/auth/status",
    tag = "Auth",
    responses(
        (status = 200, description = "Authentication status", body = AuthStatusResponse)
    )
)]
pub async fn get_auth_status(
    State(auth_state): State<AuthState>,
    headers: axum::http::HeaderMap,
) -> Json<AuthStatusResponse> {
    let app_state = &auth_state.app_state;

    if let Some(claims) = extract_and_validate_token(app_state, &headers).await {
        let revoked = app_state.revoked_tokens.lock().await;
        let is_revoked = revoked.contains(&claims.session_id);
        drop(revoked);

        if !is_revoked {
            let sessions = app_state.session_store.lock().await;
            if let Some(session) = sessions.get(&claims.session_id) {
                return Json(AuthStatusResponse {
                    authenticated: true,
                    email: Some(session.email.clone()),
                    token_expires_at: Some(claims.exp),
                });
            }
        }
    }

    Json(AuthStatusResponse {
        authenticated: false,
        email: None,
        token_expires_at: None,
    })
}

/// POST /auth/logout - Logout and revoke session
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logged out")
    )
)]
pub async fn logout(
    State(auth_state): State<AuthState>,
    headers: axum::http::HeaderMap,
) -> Json<serde_json::Value> {
    let app_state = &auth_state.app_state;

    if let Some(claims) = extract_and_validate_token(app_state, &headers).await {
        app_state
            .revoked_tokens
            .lock()
            .await
            .insert(claims.session_id.clone());
        app_state
            .session_store
            .lock()
            .await
            .remove(&claims.session_id);

        info!("Logged out and revoked session: {}", claims.session_id);
    }

    Json(serde_json::json!({ "success": true, "data": { "message": "Logged out successfully" } }))
}

/// Extract and validate a JWT access token from request headers
async fn extract_and_validate_token(
    app_state: &AppState,
    headers: &axum::http::HeaderMap,
) -> Option<Claims> {
    let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok())?;
    let token = JwtService::extract_bearer_token(auth_header)?;
    app_state.jwt_service.validate_access_token(token).ok()
}
