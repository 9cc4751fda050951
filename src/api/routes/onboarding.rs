//! Onboarding wizard routes.
//!
//! The wizard is a linear step counter over a fixed answer schema. State is
//! persisted per user so the flow survives page reloads; completion turns
//! the answers into the user's first agent.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::billing::effective_subscription;
use super::error::{ApiError, Envelope, ok};
use crate::models::{Agent, BusinessProfile, WizardState, WizardUpdate};
use crate::services::prompt_service;

#[derive(Serialize, ToSchema)]
pub struct CompleteOnboardingResponse {
    agent: Agent,
    business_profile: BusinessProfile,
}

/// Create the onboarding router
pub fn onboarding_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_wizard_state))
        .route("/", put(update_wizard_state))
        .route("/advance", post(advance_step))
        .route("/back", post(back_step))
        .route("/complete", post(complete_onboarding))
}

async fn load_or_new_state(state: &AppState, auth: &AuthContext) -> Result<WizardState, ApiError> {
    Ok(state
        .storage
        .get_wizard_state(auth.user_id())
        .await?
        .unwrap_or_else(|| WizardState::new(auth.user_id())))
}

/// GET /onboarding - Current wizard state
#[utoipa::path(
    get,
    path = "/onboarding",
    tag = "Onboarding",
    responses(
        (status = 200, description = "Wizard state", body = WizardState),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_wizard_state(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Envelope<WizardState>>, ApiError> {
    let wizard = load_or_new_state(&state, &auth).await?;
    Ok(ok(wizard))
}

/// PUT /onboarding - Merge a partial answer update
#[utoipa::path(
    put,
    path = "/onboarding",
    tag = "Onboarding",
    request_body = WizardUpdate,
    responses(
        (status = 200, description = "Updated wizard state", body = WizardState),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_wizard_state(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(update): Json<WizardUpdate>,
) -> Result<Json<Envelope<WizardState>>, ApiError> {
    let mut wizard = load_or_new_state(&state, &auth).await?;
    wizard.apply(update);
    let wizard = state.storage.upsert_wizard_state(wizard).await?;
    Ok(ok(wizard))
}

/// POST /onboarding/advance - Move to the next step (clamped)
#[utoipa::path(
    post,
    path = "/onboarding/advance",
    tag = "Onboarding",
    responses(
        (status = 200, description = "Wizard state after advancing", body = WizardState),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn advance_step(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Envelope<WizardState>>, ApiError> {
    let mut wizard = load_or_new_state(&state, &auth).await?;
    wizard.advance();
    let wizard = state.storage.upsert_wizard_state(wizard).await?;
    Ok(ok(wizard))
}

/// POST /onboarding/back - Move to the previous step (clamped)
#[utoipa::path(
    post,
    path = "/onboarding/back",
    tag = "Onboarding",
    responses(
        (status = 200, description = "Wizard state after stepping back", body = WizardState),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn back_step(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Envelope<WizardState>>, ApiError> {
    let mut wizard = load_or_new_state(&state, &auth).await?;
    wizard.back();
    let wizard = state.storage.upsert_wizard_state(wizard).await?;
    Ok(ok(wizard))
}

/// POST /onboarding/complete - Validate answers and create the first agent
#[utoipa::path(
    post,
    path = "/onboarding/complete",
    tag = "Onboarding",
    responses(
        (status = 200, description = "Agent and business profile created", body = CompleteOnboardingResponse),
        (status = 400, description = "A required answer is missing"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Plan agent limit reached")
    )
)]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Envelope<CompleteOnboardingResponse>>, ApiError> {
    let mut wizard = load_or_new_state(&state, &auth).await?;

    if wizard.completed {
        return Err(ApiError::bad_request("Onboarding already completed"));
    }
    if let Some(field) = wizard.missing_required_field() {
        return Err(ApiError::bad_request(format!(
            "Required onboarding field missing: {}",
            field
        )));
    }

    // Completion counts against the plan's agent allowance like any create
    let subscription = effective_subscription(&state, auth.user_id()).await?;
    let limits = subscription.plan.limits();
    let count = state.storage.count_agents(auth.user_id()).await?;
    if count >= limits.max_agents as i64 {
        return Err(ApiError::forbidden_with(
            "Agent limit reached for current plan",
        ));
    }

    let system_prompt = prompt_service::generate_system_prompt(&wizard);
    let greeting = prompt_service::generate_greeting(&wizard);

    let mut agent = Agent::new(
        auth.user_id(),
        wizard.agent_name.clone().unwrap_or_default(),
        wizard.model.clone().unwrap_or_default(),
        system_prompt,
    );
    agent.greeting = Some(greeting);
    let agent = state.storage.create_agent(agent).await?;

    // Carry the business answers over to the editable profile
    let mut business_profile = state
        .storage
        .get_business_profile(auth.user_id())
        .await?
        .unwrap_or_else(|| {
            BusinessProfile::new(
                auth.user_id(),
                wizard.business_name.clone().unwrap_or_default(),
            )
        });
    business_profile.business_name = wizard.business_name.clone().unwrap_or_default();
    business_profile.industry = wizard.industry.clone();
    business_profile.description = wizard.description.clone();
    business_profile.tone = wizard.tone.clone();
    business_profile.services = wizard.services.clone();
    business_profile.target_audience = wizard.target_audience.clone();
    business_profile.updated_at = chrono::Utc::now();
    let business_profile = state
        .storage
        .upsert_business_profile(business_profile)
        .await?;

    wizard.completed = true;
    state.storage.upsert_wizard_state(wizard).await?;

    info!(
        "Completed onboarding for user {}: agent {}",
        auth.user_id(),
        agent.id
    );

    Ok(ok(CompleteOnboardingResponse {
        agent,
        business_profile,
    }))
}
