//! Conversation and message routes.
//!
//! Conversations belong to one agent and one owner. Message writes enforce
//! the plan's monthly message allowance.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, post},
};
use chrono::{Datelike, TimeZone, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::agents::load_owned_agent;
use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::billing::effective_subscription;
use super::error::{ApiError, Envelope, ok};
use crate::models::{Conversation, Message, MessageRole};

#[derive(Deserialize, ToSchema)]
pub struct CreateConversationRequest {
    agent_id: Uuid,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
pub struct ListConversationsQuery {
    agent_id: Option<Uuid>,
}

#[derive(Deserialize, ToSchema)]
pub struct AppendMessageRequest {
    role: String,
    content: String,
}

/// Create the conversations router
pub fn conversations_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_conversation))
        .route("/", get(list_conversations))
        .route("/{conversation_id}", get(get_conversation))
        .route("/{conversation_id}", delete(delete_conversation))
        .route("/{conversation_id}/messages", get(list_messages))
        .route("/{conversation_id}/messages", post(append_message))
}

/// Fetch a conversation and enforce that the caller owns it.
pub async fn load_owned_conversation(
    state: &AppState,
    auth: &AuthContext,
    conversation_id: Uuid,
) -> Result<Conversation, ApiError> {
    let conversation = state
        .storage
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| ApiError::not_found("conversation"))?;

    if conversation.owner_id != auth.user_id() {
        warn!(
            "User {} attempted to access conversation {} owned by {}",
            auth.user_id(),
            conversation_id,
            conversation.owner_id
        );
        return Err(ApiError::forbidden());
    }

    Ok(conversation)
}

/// First instant of the current calendar month (UTC), for usage counting.
fn start_of_current_month() -> chrono::DateTime<Utc> {
    let now = Utc::now();
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// POST /conversations - Start a conversation with one of the caller's agents
#[utoipa::path(
    post,
    path = "/conversations",
    tag = "Conversations",
    request_body = CreateConversationRequest,
    responses(
        (status = 200, description = "Conversation created", body = Conversation),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Agent owned by another user"),
        (status = 404, description = "No such agent")
    )
)]
pub async fn create_conversation(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateConversationRequest>,
) -> Result<Json<Envelope<Conversation>>, ApiError> {
    // The agent must exist and belong to the caller
    load_owned_agent(&state, &auth, request.agent_id).await?;

    let conversation = Conversation::new(auth.user_id(), request.agent_id, request.title);
    let conversation = state.storage.create_conversation(conversation).await?;
    info!(
        "Created conversation {} for user {}",
        conversation.id,
        auth.user_id()
    );
    Ok(ok(conversation))
}

/// GET /conversations - List the caller's conversations
#[utoipa::path(
    get,
    path = "/conversations",
    tag = "Conversations",
    params(("agent_id" = Option<Uuid>, Query, description = "Filter to one agent")),
    responses(
        (status = 200, description = "Conversations owned by the caller", body = [Conversation]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListConversationsQuery>,
) -> Result<Json<Envelope<Vec<Conversation>>>, ApiError> {
    let conversations = state
        .storage
        .list_conversations(auth.user_id(), query.agent_id)
        .await?;
    Ok(ok(conversations))
}

/// GET /conversations/{conversation_id} - Get a single conversation
#[utoipa::path(
    get,
    path = "/conversations/{conversation_id}",
    tag = "Conversations",
    params(("conversation_id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "The conversation", body = Conversation),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such conversation")
    )
)]
pub async fn get_conversation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Envelope<Conversation>>, ApiError> {
    let conversation = load_owned_conversation(&state, &auth, conversation_id).await?;
    Ok(ok(conversation))
}

/// DELETE /conversations/{conversation_id} - Delete a conversation and its messages
#[utoipa::path(
    delete,
    path = "/conversations/{conversation_id}",
    tag = "Conversations",
    params(("conversation_id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such conversation")
    )
)]
pub async fn delete_conversation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    load_owned_conversation(&state, &auth, conversation_id).await?;
    state.storage.delete_conversation(conversation_id).await?;
    Ok(ok(serde_json::json!({ "deleted": conversation_id })))
}

/// GET /conversations/{conversation_id}/messages - List messages in order
#[utoipa::path(
    get,
    path = "/conversations/{conversation_id}/messages",
    tag = "Conversations",
    params(("conversation_id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages oldest first", body = [Message]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such conversation")
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<Message>>>, ApiError> {
    load_owned_conversation(&state, &auth, conversation_id).await?;
    let messages = state.storage.list_messages(conversation_id).await?;
    Ok(ok(messages))
}

/// POST /conversations/{conversation_id}/messages - Append a message
#[utoipa::path(
    post,
    path = "/conversations/{conversation_id}/messages",
    tag = "Conversations",
    params(("conversation_id" = Uuid, Path, description = "Conversation id")),
    request_body = AppendMessageRequest,
    responses(
        (status = 200, description = "Message appended", body = Message),
        (status = 400, description = "Missing content or unknown role"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owned by another user or monthly message limit reached"),
        (status = 404, description = "No such conversation")
    )
)]
pub async fn append_message(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<AppendMessageRequest>,
) -> Result<Json<Envelope<Message>>, ApiError> {
    load_owned_conversation(&state, &auth, conversation_id).await?;

    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("content is required"));
    }
    let role = MessageRole::parse(&request.role)
        .ok_or_else(|| ApiError::bad_request("role must be 'user' or 'assistant'"))?;

    // Monthly allowance check
    let subscription = effective_subscription(&state, auth.user_id()).await?;
    let limits = subscription.plan.limits();
    let used = state
        .storage
        .count_messages_since(auth.user_id(), start_of_current_month())
        .await?;
    if used >= limits.max_messages_per_month as i64 {
        return Err(ApiError::forbidden_with(
            "Monthly message limit reached for current plan",
        ));
    }

    let message = Message::new(conversation_id, auth.user_id(), role, request.content);
    let message = state.storage.append_message(message).await?;
    Ok(ok(message))
}
