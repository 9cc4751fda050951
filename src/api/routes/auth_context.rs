//! Authentication context utilities.
//!
//! Provides the extractor route handlers use to identify the caller.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::app_state::AppState;
use super::error::ApiError;
use crate::services::jwt_service::JwtService;
use crate::storage::traits::UserContext;

/// Authentication context extracted from request
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_context: UserContext,
    pub session_id: String,
}

impl AuthContext {
    pub fn user_id(&self) -> uuid::Uuid {
        self.user_context.user_id
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_bearer_token)
            .ok_or_else(|| {
                tracing::warn!("No authorization token provided");
                ApiError::unauthorized()
            })?;

        let claims = state.jwt_service.validate_access_token(token).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            ApiError::unauthorized()
        })?;

        // Revoked sessions stay unauthorized until the token expires
        let revoked = state.revoked_tokens.lock().await;
        if revoked.contains(&claims.session_id) {
            tracing::warn!("Token for revoked session {}", claims.session_id);
            return Err(ApiError::unauthorized());
        }
        drop(revoked);

        let sessions = state.session_store.lock().await;
        if !sessions.contains_key(&claims.session_id) {
            tracing::warn!("Session {} not found in store", claims.session_id);
            return Err(ApiError::unauthorized());
        }
        drop(sessions);

        Ok(AuthContext {
            user_context: UserContext {
                user_id: claims.user_id,
                email: claims.sub,
            },
            session_id: claims.session_id,
        })
    }
}
