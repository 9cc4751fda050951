//! Storage trait definitions for the API storage backends.

use crate::models::{
    Agent, Attachment, BusinessProfile, Conversation, Message, Profile, Subscription, WizardState,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User context for storage operations
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Uuid,
    pub email: String,
}

/// Storage backend trait for database operations.
///
/// All reads return the raw record; tenancy (owner_id vs caller) is checked
/// by the route handlers so the 403/404 distinction stays in one place.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    // --- Profiles ---

    /// Get a profile by application user id
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, super::StorageError>;

    /// Get a profile by the identity provider's subject id
    async fn get_profile_by_provider_id(
        &self,
        provider_user_id: &str,
    ) -> Result<Option<Profile>, super::StorageError>;

    /// Create a new profile
    async fn create_profile(&self, profile: Profile) -> Result<Profile, super::StorageError>;

    // --- Agents ---

    async fn create_agent(&self, agent: Agent) -> Result<Agent, super::StorageError>;

    async fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>, super::StorageError>;

    async fn list_agents(&self, owner_id: Uuid) -> Result<Vec<Agent>, super::StorageError>;

    async fn update_agent(&self, agent: Agent) -> Result<Agent, super::StorageError>;

    async fn delete_agent(&self, agent_id: Uuid) -> Result<(), super::StorageError>;

    async fn count_agents(&self, owner_id: Uuid) -> Result<i64, super::StorageError>;

    // --- Conversations ---

    async fn create_conversation(
        &self,
        conversation: Conversation,
    ) -> Result<Conversation, super::StorageError>;

    async fn get_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, super::StorageError>;

    /// List conversations for an owner, optionally filtered to one agent
    async fn list_conversations(
        &self,
        owner_id: Uuid,
        agent_id: Option<Uuid>,
    ) -> Result<Vec<Conversation>, super::StorageError>;

    /// Delete a conversation and its messages
    async fn delete_conversation(&self, conversation_id: Uuid)
    -> Result<(), super::StorageError>;

    // --- Messages ---

    async fn append_message(&self, message: Message) -> Result<Message, super::StorageError>;

    async fn list_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, super::StorageError>;

    /// Count messages written by an owner since a point in time (plan limits)
    async fn count_messages_since(
        &self,
        owner_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, super::StorageError>;

    // --- Attachments ---

    async fn create_attachment(
        &self,
        attachment: Attachment,
    ) -> Result<Attachment, super::StorageError>;

    async fn get_attachment(
        &self,
        attachment_id: Uuid,
    ) -> Result<Option<Attachment>, super::StorageError>;

    async fn list_attachments(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Attachment>, super::StorageError>;

    // --- Business profile ---

    async fn get_business_profile(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<BusinessProfile>, super::StorageError>;

    /// Insert or replace the single business profile for an owner
    async fn upsert_business_profile(
        &self,
        profile: BusinessProfile,
    ) -> Result<BusinessProfile, super::StorageError>;

    // --- Onboarding wizard state ---

    async fn get_wizard_state(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<WizardState>, super::StorageError>;

    async fn upsert_wizard_state(
        &self,
        state: WizardState,
    ) -> Result<WizardState, super::StorageError>;

    // --- Subscriptions ---

    async fn get_subscription(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<Subscription>, super::StorageError>;

    async fn upsert_subscription(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, super::StorageError>;
}
