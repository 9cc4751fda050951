//! Integration tests for the response envelope and error-status mapping.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use agentdesk_api::models::{
    Agent, Attachment, BusinessProfile, Conversation, Message, Profile, Subscription, WizardState,
};
use agentdesk_api::routes::AppState;
use agentdesk_api::services::jwt_service::JwtService;
use agentdesk_api::storage::{StorageBackend, StorageError};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

/// Backend where every operation fails, for exercising the 500 path.
struct FailingStorageBackend;

impl FailingStorageBackend {
    fn offline() -> StorageError {
        StorageError::ConnectionError("storage offline".to_string())
    }
}

#[async_trait::async_trait]
impl StorageBackend for FailingStorageBackend {
    async fn get_profile(&self, _user_id: Uuid) -> Result<Option<Profile>, StorageError> {
        Err(Self::offline())
    }
    async fn get_profile_by_provider_id(
        &self,
        _provider_user_id: &str,
    ) -> Result<Option<Profile>, StorageError> {
        Err(Self::offline())
    }
    async fn create_profile(&self, _profile: Profile) -> Result<Profile, StorageError> {
        Err(Self::offline())
    }
    async fn create_agent(&self, _agent: Agent) -> Result<Agent, StorageError> {
        Err(Self::offline())
    }
    async fn get_agent(&self, _agent_id: Uuid) -> Result<Option<Agent>, StorageError> {
        Err(Self::offline())
    }
    async fn list_agents(&self, _owner_id: Uuid) -> Result<Vec<Agent>, StorageError> {
        Err(Self::offline())
    }
    async fn update_agent(&self, _agent: Agent) -> Result<Agent, StorageError> {
        Err(Self::offline())
    }
    async fn delete_agent(&self, _agent_id: Uuid) -> Result<(), StorageError> {
        Err(Self::offline())
    }
    async fn count_agents(&self, _owner_id: Uuid) -> Result<i64, StorageError> {
        Err(Self::offline())
    }
    async fn create_conversation(
        &self,
        _conversation: Conversation,
    ) -> Result<Conversation, StorageError> {
        Err(Self::offline())
    }
    async fn get_conversation(
        &self,
        _conversation_id: Uuid,
    ) -> Result<Option<Conversation>, StorageError> {
        Err(Self::offline())
    }
    async fn list_conversations(
        &self,
        _owner_id: Uuid,
        _agent_id: Option<Uuid>,
    ) -> Result<Vec<Conversation>, StorageError> {
        Err(Self::offline())
    }
    async fn delete_conversation(&self, _conversation_id: Uuid) -> Result<(), StorageError> {
        Err(Self::offline())
    }
    async fn append_message(&self, _message: Message) -> Result<Message, StorageError> {
        Err(Self::offline())
    }
    async fn list_messages(&self, _conversation_id: Uuid) -> Result<Vec<Message>, StorageError> {
        Err(Self::offline())
    }
    async fn count_messages_since(
        &self,
        _owner_id: Uuid,
        _since: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        Err(Self::offline())
    }
    async fn create_attachment(&self, _attachment: Attachment) -> Result<Attachment, StorageError> {
        Err(Self::offline())
    }
    async fn get_attachment(
        &self,
        _attachment_id: Uuid,
    ) -> Result<Option<Attachment>, StorageError> {
        Err(Self::offline())
    }
    async fn list_attachments(
        &self,
        _conversation_id: Uuid,
    ) -> Result<Vec<Attachment>, StorageError> {
        Err(Self::offline())
    }
    async fn get_business_profile(
        &self,
        _owner_id: Uuid,
    ) -> Result<Option<BusinessProfile>, StorageError> {
        Err(Self::offline())
    }
    async fn upsert_business_profile(
        &self,
        _profile: BusinessProfile,
    ) -> Result<BusinessProfile, StorageError> {
        Err(Self::offline())
    }
    async fn get_wizard_state(&self, _owner_id: Uuid) -> Result<Option<WizardState>, StorageError> {
        Err(Self::offline())
    }
    async fn upsert_wizard_state(&self, _state: WizardState) -> Result<WizardState, StorageError> {
        Err(Self::offline())
    }
    async fn get_subscription(
        &self,
        _owner_id: Uuid,
    ) -> Result<Option<Subscription>, StorageError> {
        Err(Self::offline())
    }
    async fn upsert_subscription(
        &self,
        _subscription: Subscription,
    ) -> Result<Subscription, StorageError> {
        Err(Self::offline())
    }
}

/// State over the failing backend with a session minted out of band.
async fn failing_state_with_session() -> (AppState, String) {
    let state = AppState::with_backend(
        Arc::new(FailingStorageBackend),
        Arc::new(JwtService::new(common::TEST_JWT_SECRET)),
    );

    let user_id = Uuid::new_v4();
    let session_id = Uuid::new_v4().to_string();
    let tokens = state
        .jwt_service
        .generate_token_pair("owner@example.com", user_id, &session_id)
        .unwrap();
    state.session_store.lock().await.insert(
        session_id,
        agentdesk_api::routes::auth::SessionMetadata {
            user_id,
            email: "owner@example.com".to_string(),
            created_at: Utc::now(),
            last_activity: Utc::now(),
        },
    );

    (state, tokens.access_token)
}

#[tokio::test]
async fn test_storage_failure_maps_to_500_with_message() {
    let (state, token) = failing_state_with_session().await;
    let server = common::test_server(state);
    let (name, value) = common::auth_header(&token);

    let response = server.get("/agents").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Connection error: storage offline");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_storage_failure_on_writes_also_500() {
    let (state, token) = failing_state_with_session().await;
    let server = common::test_server(state);
    let (name, value) = common::auth_header(&token);

    let response = server
        .post("/agents")
        .add_header(name, value)
        .json(&json!({ "name": "Bot", "model": "gpt-4o-mini" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_success_envelope_shape() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state);
    let (name, value) = common::auth_header(&token);

    let response = server.get("/agents").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["data"].is_array());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_not_found_envelope_shape() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state);
    let (name, value) = common::auth_header(&token);

    let response = server
        .get(&format!("/agents/{}", Uuid::new_v4()))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "agent not found");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_unauthorized_envelope_shape() {
    let state = common::test_state();
    let server = common::test_server(state);

    let response = server.get("/agents").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
async fn test_malformed_uuid_path_is_client_error() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state);
    let (name, value) = common::auth_header(&token);

    let response = server
        .get("/agents/not-a-uuid")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
