//! Browser gateway middleware.
//!
//! Sits in front of page routes and steers browsers by auth state:
//! unauthenticated requests for app pages are redirected to the login page,
//! and authenticated requests for the login/signup pages are redirected to
//! the dashboard. API and auth endpoints are left alone so programmatic
//! clients always receive real status codes instead of redirects.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::routes::app_state::AppState;
use crate::services::jwt_service::JwtService;

/// Page prefixes that require a signed-in user.
const PROTECTED_PREFIXES: &[&str] = &[
    "/dashboard",
    "/agents",
    "/settings",
    "/billing",
    "/onboarding",
];

/// Pages that only make sense for signed-out visitors.
const PUBLIC_ONLY_PATHS: &[&str] = &["/login", "/signup"];

/// Prefixes the gateway never touches.
const EXEMPT_PREFIXES: &[&str] = &["/api", "/auth"];

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// True when `path` is the prefix itself or a page under it.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn is_protected_path(path: &str) -> bool {
    PROTECTED_PREFIXES
        .iter()
        .any(|prefix| matches_prefix(path, prefix))
}

pub fn is_public_only_path(path: &str) -> bool {
    PUBLIC_ONLY_PATHS
        .iter()
        .any(|prefix| matches_prefix(path, prefix))
}

pub fn is_exempt_path(path: &str) -> bool {
    EXEMPT_PREFIXES
        .iter()
        .any(|prefix| matches_prefix(path, prefix))
}

/// Pull an access token from the Authorization header or the
/// `access-token` cookie browsers carry between page loads.
fn extract_token(request: &Request, jar: &CookieJar) -> Option<String> {
    if let Some(header_value) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        if let Some(token) = JwtService::extract_bearer_token(header_value) {
            return Some(token.to_string());
        }
    }
    jar.get("access-token").map(|c| c.value().to_string())
}

/// The token must validate, belong to a live session, and not be revoked.
async fn is_authenticated(state: &AppState, token: &str) -> bool {
    let claims = match state.jwt_service.validate_access_token(token) {
        Ok(claims) => claims,
        Err(_) => return false,
    };

    if state
        .revoked_tokens
        .lock()
        .await
        .contains(&claims.session_id)
    {
        return false;
    }

    state
        .session_store
        .lock()
        .await
        .contains_key(&claims.session_id)
}

/// Gateway middleware applied ahead of the page router.
pub async fn gateway_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if is_exempt_path(&path) {
        return next.run(request).await;
    }

    let authenticated = match extract_token(&request, &jar) {
        Some(token) => is_authenticated(&state, &token).await,
        None => false,
    };

    if is_protected_path(&path) && !authenticated {
        return Redirect::temporary(LOGIN_PATH).into_response();
    }
    if is_public_only_path(&path) && authenticated {
        return Redirect::temporary(DASHBOARD_PATH).into_response();
    }

    next.run(request).await
}
