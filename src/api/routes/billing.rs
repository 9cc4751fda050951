//! Billing routes.
//!
//! The payments provider owns the whole payment state machine; these
//! handlers only create hosted checkout/portal sessions and report the
//! subscription mirror plus plan usage.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::{ApiError, Envelope, ok};
use crate::models::{PlanLimits, PlanTier, Subscription, SubscriptionStatus};
use crate::services::billing_service::BillingService;

#[derive(Deserialize, ToSchema)]
pub struct CheckoutRequest {
    plan: String,
    #[serde(default)]
    success_url: Option<String>,
    #[serde(default)]
    cancel_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct PortalRequest {
    #[serde(default)]
    return_url: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    url: String,
}

#[derive(Serialize, ToSchema)]
pub struct SubscriptionResponse {
    subscription: Subscription,
    limits: PlanLimits,
    used_agents: i64,
}

/// Create the billing router
pub fn billing_router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/portal", post(create_portal))
        .route("/subscription", get(get_subscription))
}

/// Stored subscription for a user, or the implicit free tier.
pub async fn effective_subscription(
    state: &AppState,
    owner_id: Uuid,
) -> Result<Subscription, ApiError> {
    Ok(state
        .storage
        .get_subscription(owner_id)
        .await?
        .unwrap_or_else(|| Subscription::free(owner_id)))
}

fn frontend_url() -> String {
    std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// POST /billing/checkout - Create a hosted checkout session for a paid plan
#[utoipa::path(
    post,
    path = "/billing/checkout",
    tag = "Billing",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Hosted checkout URL", body = SessionResponse),
        (status = 400, description = "Unknown plan, free plan, or plan without a configured price"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Provider call failed")
    )
)]
pub async fn create_checkout(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Envelope<SessionResponse>>, ApiError> {
    let plan = PlanTier::parse(request.plan.trim())
        .ok_or_else(|| ApiError::bad_request("unknown plan"))?;
    if plan == PlanTier::Free {
        return Err(ApiError::bad_request("free plan requires no checkout"));
    }
    let price_id = BillingService::price_id_for_plan(plan)
        .ok_or_else(|| ApiError::bad_request("plan has no configured price"))?;

    let frontend = frontend_url();
    let success_url = request
        .success_url
        .unwrap_or_else(|| format!("{}/billing/success", frontend));
    let cancel_url = request
        .cancel_url
        .unwrap_or_else(|| format!("{}/billing/cancel", frontend));

    let session = state
        .billing_service
        .create_checkout_session(
            &auth.user_context.email,
            &price_id,
            &success_url,
            &cancel_url,
        )
        .await
        .map_err(ApiError::internal)?;

    info!(
        "Created checkout session for user {} plan {}",
        auth.user_id(),
        plan.as_str()
    );
    Ok(ok(SessionResponse { url: session.url }))
}

/// POST /billing/portal - Create a hosted billing portal session
#[utoipa::path(
    post,
    path = "/billing/portal",
    tag = "Billing",
    request_body = PortalRequest,
    responses(
        (status = 200, description = "Hosted portal URL", body = SessionResponse),
        (status = 400, description = "Caller has no billing customer yet"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Provider call failed")
    )
)]
pub async fn create_portal(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<PortalRequest>,
) -> Result<Json<Envelope<SessionResponse>>, ApiError> {
    let subscription = effective_subscription(&state, auth.user_id()).await?;
    let customer_id = subscription
        .billing_customer_id
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("no billing customer for this account"))?;

    let return_url = request
        .return_url
        .unwrap_or_else(|| format!("{}/settings/billing", frontend_url()));

    let session = state
        .billing_service
        .create_portal_session(customer_id, &return_url)
        .await
        .map_err(ApiError::internal)?;

    Ok(ok(SessionResponse { url: session.url }))
}

/// GET /billing/subscription - Subscription state, plan limits, and usage
#[utoipa::path(
    get,
    path = "/billing/subscription",
    tag = "Billing",
    responses(
        (status = 200, description = "Subscription with limits", body = SubscriptionResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_subscription(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Envelope<SubscriptionResponse>>, ApiError> {
    let mut subscription = effective_subscription(&state, auth.user_id()).await?;

    // Refresh the mirror from the provider when the user has a billing
    // customer. Failures fall back to the stored state.
    if let Some(customer_id) = subscription.billing_customer_id.clone() {
        match state.billing_service.fetch_subscription(&customer_id).await {
            Ok(Some(provider)) => {
                if let Some(status) = SubscriptionStatus::parse(&provider.status) {
                    subscription.status = status;
                }
                subscription.current_period_end = provider
                    .current_period_end
                    .and_then(|ts| DateTime::from_timestamp(ts, 0));
                subscription.updated_at = Utc::now();
                subscription = state.storage.upsert_subscription(subscription).await?;
            }
            Ok(None) => {}
            Err(e) => warn!("Subscription refresh failed: {}", e),
        }
    }
    let limits = subscription.plan.limits();
    let used_agents = state.storage.count_agents(auth.user_id()).await?;

    Ok(ok(SubscriptionResponse {
        subscription,
        limits,
        used_agents,
    }))
}
