//! In-memory storage backend.
//!
//! Used when no `DATABASE_URL` is configured (local development) and by the
//! integration tests, which need observable state without a live database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::StorageBackend;
use super::StorageError;
use crate::models::{
    Agent, Attachment, BusinessProfile, Conversation, Message, Profile, Subscription, WizardState,
};

#[derive(Default)]
struct Inner {
    profiles: HashMap<Uuid, Profile>,
    agents: HashMap<Uuid, Agent>,
    conversations: HashMap<Uuid, Conversation>,
    messages: HashMap<Uuid, Vec<Message>>,
    attachments: HashMap<Uuid, Attachment>,
    business_profiles: HashMap<Uuid, BusinessProfile>,
    wizard_states: HashMap<Uuid, WizardState>,
    subscriptions: HashMap<Uuid, Subscription>,
}

/// HashMap-backed storage behind a single RwLock.
#[derive(Default)]
pub struct MemoryStorageBackend {
    inner: RwLock<Inner>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorageError> {
        Ok(self.inner.read().await.profiles.get(&user_id).cloned())
    }

    async fn get_profile_by_provider_id(
        &self,
        provider_user_id: &str,
    ) -> Result<Option<Profile>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .profiles
            .values()
            .find(|p| p.provider_user_id == provider_user_id)
            .cloned())
    }

    async fn create_profile(&self, profile: Profile) -> Result<Profile, StorageError> {
        self.inner
            .write()
            .await
            .profiles
            .insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn create_agent(&self, agent: Agent) -> Result<Agent, StorageError> {
        self.inner.write().await.agents.insert(agent.id, agent.clone());
        Ok(agent)
    }

    async fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>, StorageError> {
        Ok(self.inner.read().await.agents.get(&agent_id).cloned())
    }

    async fn list_agents(&self, owner_id: Uuid) -> Result<Vec<Agent>, StorageError> {
        let mut agents: Vec<Agent> = self
            .inner
            .read()
            .await
            .agents
            .values()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect();
        agents.sort_by_key(|a| a.created_at);
        Ok(agents)
    }

    async fn update_agent(&self, agent: Agent) -> Result<Agent, StorageError> {
        let mut inner = self.inner.write().await;
        if !inner.agents.contains_key(&agent.id) {
            return Err(StorageError::not_found("agent", agent.id));
        }
        inner.agents.insert(agent.id, agent.clone());
        Ok(agent)
    }

    async fn delete_agent(&self, agent_id: Uuid) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        inner
            .agents
            .remove(&agent_id)
            .ok_or_else(|| StorageError::not_found("agent", agent_id))?;
        Ok(())
    }

    async fn count_agents(&self, owner_id: Uuid) -> Result<i64, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .agents
            .values()
            .filter(|a| a.owner_id == owner_id)
            .count() as i64)
    }

    async fn create_conversation(
        &self,
        conversation: Conversation,
    ) -> Result<Conversation, StorageError> {
        self.inner
            .write()
            .await
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .conversations
            .get(&conversation_id)
            .cloned())
    }

    async fn list_conversations(
        &self,
        owner_id: Uuid,
        agent_id: Option<Uuid>,
    ) -> Result<Vec<Conversation>, StorageError> {
        let mut conversations: Vec<Conversation> = self
            .inner
            .read()
            .await
            .conversations
            .values()
            .filter(|c| c.owner_id == owner_id)
            .filter(|c| agent_id.is_none_or(|id| c.agent_id == id))
            .cloned()
            .collect();
        conversations.sort_by_key(|c| c.created_at);
        Ok(conversations)
    }

    async fn delete_conversation(&self, conversation_id: Uuid) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        inner
            .conversations
            .remove(&conversation_id)
            .ok_or_else(|| StorageError::not_found("conversation", conversation_id))?;
        inner.messages.remove(&conversation_id);
        Ok(())
    }

    async fn append_message(&self, message: Message) -> Result<Message, StorageError> {
        self.inner
            .write()
            .await
            .messages
            .entry(message.conversation_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_messages_since(
        &self,
        owner_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .messages
            .values()
            .flatten()
            .filter(|m| m.owner_id == owner_id && m.created_at >= since)
            .count() as i64)
    }

    async fn create_attachment(&self, attachment: Attachment) -> Result<Attachment, StorageError> {
        self.inner
            .write()
            .await
            .attachments
            .insert(attachment.id, attachment.clone());
        Ok(attachment)
    }

    async fn get_attachment(
        &self,
        attachment_id: Uuid,
    ) -> Result<Option<Attachment>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .attachments
            .get(&attachment_id)
            .cloned())
    }

    async fn list_attachments(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Attachment>, StorageError> {
        let mut attachments: Vec<Attachment> = self
            .inner
            .read()
            .await
            .attachments
            .values()
            .filter(|a| a.conversation_id == conversation_id)
            .cloned()
            .collect();
        attachments.sort_by_key(|a| a.created_at);
        Ok(attachments)
    }

    async fn get_business_profile(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<BusinessProfile>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .business_profiles
            .get(&owner_id)
            .cloned())
    }

    async fn upsert_business_profile(
        &self,
        profile: BusinessProfile,
    ) -> Result<BusinessProfile, StorageError> {
        self.inner
            .write()
            .await
            .business_profiles
            .insert(profile.owner_id, profile.clone());
        Ok(profile)
    }

    async fn get_wizard_state(&self, owner_id: Uuid) -> Result<Option<WizardState>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .wizard_states
            .get(&owner_id)
            .cloned())
    }

    async fn upsert_wizard_state(&self, state: WizardState) -> Result<WizardState, StorageError> {
        self.inner
            .write()
            .await
            .wizard_states
            .insert(state.owner_id, state.clone());
        Ok(state)
    }

    async fn get_subscription(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<Subscription>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .subscriptions
            .get(&owner_id)
            .cloned())
    }

    async fn upsert_subscription(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, StorageError> {
        self.inner
            .write()
            .await
            .subscriptions
            .insert(subscription.owner_id, subscription.clone());
        Ok(subscription)
    }
}
