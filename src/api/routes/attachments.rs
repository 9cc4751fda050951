//! Attachment metadata and signed-URL routes.
//!
//! File bytes never pass through this API. Clients register metadata for an
//! object they uploaded to the store, then fetch a time-limited signed URL
//! to read it back.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::conversations::load_owned_conversation;
use super::error::{ApiError, Envelope, ok};
use crate::models::Attachment;
use crate::services::signed_url_service::SignedUrl;

#[derive(Deserialize, ToSchema)]
pub struct CreateAttachmentRequest {
    file_name: String,
    content_type: String,
    size_bytes: i64,
}

#[derive(Deserialize)]
pub struct SignedUrlQuery {
    expires_in: Option<u64>,
}

/// Routes nested under /conversations/{conversation_id}/attachments
pub fn conversation_attachments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_attachment))
        .route("/", get(list_attachments))
}

/// Routes mounted at /attachments
pub fn attachments_router() -> Router<AppState> {
    Router::new().route("/{attachment_id}/url", get(get_signed_url))
}

/// POST /conversations/{conversation_id}/attachments - Register uploaded file metadata
#[utoipa::path(
    post,
    path = "/conversations/{conversation_id}/attachments",
    tag = "Attachments",
    params(("conversation_id" = Uuid, Path, description = "Conversation id")),
    request_body = CreateAttachmentRequest,
    responses(
        (status = 200, description = "Attachment recorded", body = Attachment),
        (status = 400, description = "Missing file_name or content_type"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Conversation owned by another user"),
        (status = 404, description = "No such conversation")
    )
)]
pub async fn create_attachment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<CreateAttachmentRequest>,
) -> Result<Json<Envelope<Attachment>>, ApiError> {
    load_owned_conversation(&state, &auth, conversation_id).await?;

    if request.file_name.trim().is_empty() {
        return Err(ApiError::bad_request("file_name is required"));
    }
    if request.content_type.trim().is_empty() {
        return Err(ApiError::bad_request("content_type is required"));
    }
    if request.size_bytes < 0 {
        return Err(ApiError::bad_request("size_bytes cannot be negative"));
    }

    let attachment = Attachment::new(
        auth.user_id(),
        conversation_id,
        request.file_name.trim().to_string(),
        request.content_type.trim().to_string(),
        request.size_bytes,
    );
    let attachment = state.storage.create_attachment(attachment).await?;
    Ok(ok(attachment))
}

/// GET /conversations/{conversation_id}/attachments - List attachments
#[utoipa::path(
    get,
    path = "/conversations/{conversation_id}/attachments",
    tag = "Attachments",
    params(("conversation_id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Attachments for the conversation", body = [Attachment]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Conversation owned by another user"),
        (status = 404, description = "No such conversation")
    )
)]
pub async fn list_attachments(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<Attachment>>>, ApiError> {
    load_owned_conversation(&state, &auth, conversation_id).await?;
    let attachments = state.storage.list_attachments(conversation_id).await?;
    Ok(ok(attachments))
}

/// GET /attachments/{attachment_id}/url - Issue a time-limited signed URL
#[utoipa::path(
    get,
    path = "/attachments/{attachment_id}/url",
    tag = "Attachments",
    params(
        ("attachment_id" = Uuid, Path, description = "Attachment id"),
        ("expires_in" = Option<u64>, Query, description = "Link lifetime in seconds")
    ),
    responses(
        (status = 200, description = "Signed URL with expiry"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such attachment"),
        (status = 500, description = "Storage service failure")
    )
)]
pub async fn get_signed_url(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(attachment_id): Path<Uuid>,
    Query(query): Query<SignedUrlQuery>,
) -> Result<Json<Envelope<SignedUrl>>, ApiError> {
    let attachment = state
        .storage
        .get_attachment(attachment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("attachment"))?;

    if attachment.owner_id != auth.user_id() {
        warn!(
            "User {} attempted to sign attachment {} owned by {}",
            auth.user_id(),
            attachment_id,
            attachment.owner_id
        );
        return Err(ApiError::forbidden());
    }

    let signed = state
        .signed_url_service
        .create_signed_url(&attachment.storage_path, query.expires_in)
        .await
        .map_err(ApiError::internal)?;

    Ok(ok(signed))
}
