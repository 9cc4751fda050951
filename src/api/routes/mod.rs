//! API routes module - organizes all route handlers.

pub mod agents;
pub mod app_state;
pub mod attachments;
pub mod auth;
pub mod auth_context;
pub mod billing;
pub mod business_profile;
pub mod conversations;
pub mod error;
pub mod onboarding;
pub mod openapi;

use axum::Router;
pub use app_state::AppState;

/// Create the main API router combining all route modules
pub fn create_api_router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::auth_router(app_state.clone()))
        .nest("/agents", agents::agents_router())
        .nest("/conversations", conversations::conversations_router())
        .nest(
            "/conversations/{conversation_id}/attachments",
            attachments::conversation_attachments_router(),
        )
        .nest("/attachments", attachments::attachments_router())
        .nest(
            "/business-profile",
            business_profile::business_profile_router(),
        )
        .nest("/onboarding", onboarding::onboarding_router())
        .nest("/billing", billing::billing_router())
        // OpenAPI documentation endpoints
        .merge(openapi::openapi_router())
    // Note: State is applied by callers who need it (e.g., TestServer)
    // For production use, call .with_state(app_state) after creating the router
}

/// Create the application state (synchronous, in-memory storage).
///
/// Note: For PostgreSQL storage, call `init_storage()` on the returned state.
pub fn create_app_state() -> AppState {
    AppState::new()
}

/// Create the application state with storage initialization (async).
///
/// This is the preferred method for production use.
pub async fn create_app_state_with_storage() -> Result<AppState, crate::storage::StorageError> {
    let mut state = AppState::new();
    state.init_storage().await?;
    Ok(state)
}
