//! Business profile routes.
//!
//! One profile per user, written through an upsert.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, put},
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::{ApiError, Envelope, ok};
use crate::models::BusinessProfile;

#[derive(Deserialize, ToSchema)]
pub struct UpsertBusinessProfileRequest {
    business_name: String,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    tone: Option<String>,
    #[serde(default)]
    services: Vec<String>,
    #[serde(default)]
    target_audience: Option<String>,
}

/// Create the business profile router
pub fn business_profile_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_business_profile))
        .route("/", put(upsert_business_profile))
}

/// GET /business-profile - Fetch the caller's business profile
#[utoipa::path(
    get,
    path = "/business-profile",
    tag = "BusinessProfile",
    responses(
        (status = 200, description = "The profile, or null if never written", body = BusinessProfile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_business_profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Envelope<Option<BusinessProfile>>>, ApiError> {
    let profile = state.storage.get_business_profile(auth.user_id()).await?;
    Ok(ok(profile))
}

/// PUT /business-profile - Create or replace the caller's business profile
#[utoipa::path(
    put,
    path = "/business-profile",
    tag = "BusinessProfile",
    request_body = UpsertBusinessProfileRequest,
    responses(
        (status = 200, description = "Stored profile", body = BusinessProfile),
        (status = 400, description = "Missing business_name"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn upsert_business_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<UpsertBusinessProfileRequest>,
) -> Result<Json<Envelope<BusinessProfile>>, ApiError> {
    let business_name = request.business_name.trim();
    if business_name.is_empty() {
        return Err(ApiError::bad_request("business_name is required"));
    }

    // Keep the existing row id on replace so the record stays stable
    let existing = state.storage.get_business_profile(auth.user_id()).await?;
    let mut profile = match existing {
        Some(profile) => profile,
        None => BusinessProfile::new(auth.user_id(), business_name.to_string()),
    };

    profile.business_name = business_name.to_string();
    profile.industry = request.industry;
    profile.description = request.description;
    profile.website = request.website;
    profile.tone = request.tone;
    profile.services = request.services;
    profile.target_audience = request.target_audience;
    profile.updated_at = Utc::now();

    let profile = state.storage.upsert_business_profile(profile).await?;
    Ok(ok(profile))
}
