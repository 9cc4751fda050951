//! Agent CRUD routes.
//!
//! All endpoints require JWT authentication via Authorization header.
//! Every by-id operation compares the record's owner against the caller;
//! a mismatch is a 403, never a silent 404.

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post, put},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::billing::effective_subscription;
use super::error::{ApiError, Envelope, ok};
use crate::models::Agent;

#[derive(Deserialize, ToSchema)]
pub struct CreateAgentRequest {
    name: String,
    model: String,
    #[serde(default)]
    system_prompt: Option<String>,
    #[serde(default)]
    greeting: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAgentRequest {
    name: Option<String>,
    model: Option<String>,
    system_prompt: Option<String>,
    greeting: Option<String>,
}

/// Create the agents router
pub fn agents_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_agent))
        .route("/", get(list_agents))
        .route("/{agent_id}", get(get_agent))
        .route("/{agent_id}", put(update_agent))
        .route("/{agent_id}", delete(delete_agent))
}

/// Fetch an agent and enforce that the caller owns it.
pub async fn load_owned_agent(
    state: &AppState,
    auth: &AuthContext,
    agent_id: Uuid,
) -> Result<Agent, ApiError> {
    let agent = state
        .storage
        .get_agent(agent_id)
        .await?
        .ok_or_else(|| ApiError::not_found("agent"))?;

    if agent.owner_id != auth.user_id() {
        warn!(
            "User {} attempted to access agent {} owned by {}",
            auth.user_id(),
            agent_id,
            agent.owner_id
        );
        return Err(ApiError::forbidden());
    }

    Ok(agent)
}

/// POST /agents - Create a new agent
#[utoipa::path(
    post,
    path = "/agents",
    tag = "Agents",
    request_body = CreateAgentRequest,
    responses(
        (status = 200, description = "Agent created", body = Agent),
        (status = 400, description = "Missing name or model"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Plan agent limit reached")
    )
)]
pub async fn create_agent(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateAgentRequest>,
) -> Result<Json<Envelope<Agent>>, ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let model = request.model.trim();
    if model.is_empty() {
        return Err(ApiError::bad_request("model is required"));
    }

    // Plan entitlement check
    let subscription = effective_subscription(&state, auth.user_id()).await?;
    let limits = subscription.plan.limits();
    let count = state.storage.count_agents(auth.user_id()).await?;
    if count >= limits.max_agents as i64 {
        return Err(ApiError::forbidden_with(
            "Agent limit reached for current plan",
        ));
    }

    let mut agent = Agent::new(
        auth.user_id(),
        name.to_string(),
        model.to_string(),
        request.system_prompt.unwrap_or_default(),
    );
    agent.greeting = request.greeting;

    let agent = state.storage.create_agent(agent).await?;
    info!("Created agent {} for user {}", agent.id, auth.user_id());
    Ok(ok(agent))
}

/// GET /agents - List the caller's agents
#[utoipa::path(
    get,
    path = "/agents",
    tag = "Agents",
    responses(
        (status = 200, description = "Agents owned by the caller", body = [Agent]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_agents(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Envelope<Vec<Agent>>>, ApiError> {
    let agents = state.storage.list_agents(auth.user_id()).await?;
    Ok(ok(agents))
}

/// GET /agents/{agent_id} - Get a single agent
#[utoipa::path(
    get,
    path = "/agents/{agent_id}",
    tag = "Agents",
    params(("agent_id" = Uuid, Path, description = "Agent id")),
    responses(
        (status = 200, description = "The agent", body = Agent),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such agent")
    )
)]
pub async fn get_agent(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(agent_id): Path<Uuid>,
) -> Result<Json<Envelope<Agent>>, ApiError> {
    let agent = load_owned_agent(&state, &auth, agent_id).await?;
    Ok(ok(agent))
}

/// PUT /agents/{agent_id} - Update an agent
#[utoipa::path(
    put,
    path = "/agents/{agent_id}",
    tag = "Agents",
    params(("agent_id" = Uuid, Path, description = "Agent id")),
    request_body = UpdateAgentRequest,
    responses(
        (status = 200, description = "Updated agent", body = Agent),
        (status = 400, description = "Blank name or model"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such agent")
    )
)]
pub async fn update_agent(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(agent_id): Path<Uuid>,
    Json(request): Json<UpdateAgentRequest>,
) -> Result<Json<Envelope<Agent>>, ApiError> {
    let mut agent = load_owned_agent(&state, &auth, agent_id).await?;

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("name cannot be blank"));
        }
        agent.name = name.trim().to_string();
    }
    if let Some(model) = request.model {
        if model.trim().is_empty() {
            return Err(ApiError::bad_request("model cannot be blank"));
        }
        agent.model = model.trim().to_string();
    }
    if let Some(system_prompt) = request.system_prompt {
        agent.system_prompt = system_prompt;
    }
    if let Some(greeting) = request.greeting {
        agent.greeting = Some(greeting);
    }
    agent.updated_at = Utc::now();

    let agent = state.storage.update_agent(agent).await?;
    Ok(ok(agent))
}

/// DELETE /agents/{agent_id} - Delete an agent
#[utoipa::path(
    delete,
    path = "/agents/{agent_id}",
    tag = "Agents",
    params(("agent_id" = Uuid, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Agent deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such agent")
    )
)]
pub async fn delete_agent(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(agent_id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    load_owned_agent(&state, &auth, agent_id).await?;
    state.storage.delete_agent(agent_id).await?;
    info!("Deleted agent {} for user {}", agent_id, auth.user_id());
    Ok(ok(serde_json::json!({ "deleted": agent_id })))
}
