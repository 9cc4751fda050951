//! PostgreSQL storage backend implementation.
//!
//! Uses sqlx for database operations and implements the StorageBackend trait.
//! Queries use the runtime API (`sqlx::query(..).bind(..)`) so the crate
//! builds without a live database at compile time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::traits::StorageBackend;
use super::StorageError;
use crate::models::{
    Agent, Attachment, BusinessProfile, Conversation, Message, MessageRole, PlanTier, Profile,
    Subscription, SubscriptionStatus, WizardState,
};

/// PostgreSQL storage backend implementation.
pub struct PostgresStorageBackend {
    pool: PgPool,
}

impl PostgresStorageBackend {
    /// Create a new PostgreSQL storage backend.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> StorageError {
    StorageError::ConnectionError(e.to_string())
}

fn row_err(e: sqlx::Error) -> StorageError {
    StorageError::Other(format!("Failed to read row: {}", e))
}

fn profile_from_row(row: &PgRow) -> Result<Profile, StorageError> {
    Ok(Profile {
        id: row.try_get("id").map_err(row_err)?,
        email: row.try_get("email").map_err(row_err)?,
        display_name: row.try_get("display_name").map_err(row_err)?,
        provider_user_id: row.try_get("provider_user_id").map_err(row_err)?,
        created_at: row.try_get("created_at").map_err(row_err)?,
    })
}

fn agent_from_row(row: &PgRow) -> Result<Agent, StorageError> {
    Ok(Agent {
        id: row.try_get("id").map_err(row_err)?,
        owner_id: row.try_get("owner_id").map_err(row_err)?,
        name: row.try_get("name").map_err(row_err)?,
        model: row.try_get("model").map_err(row_err)?,
        system_prompt: row.try_get("system_prompt").map_err(row_err)?,
        greeting: row.try_get("greeting").map_err(row_err)?,
        created_at: row.try_get("created_at").map_err(row_err)?,
        updated_at: row.try_get("updated_at").map_err(row_err)?,
    })
}

fn conversation_from_row(row: &PgRow) -> Result<Conversation, StorageError> {
    Ok(Conversation {
        id: row.try_get("id").map_err(row_err)?,
        owner_id: row.try_get("owner_id").map_err(row_err)?,
        agent_id: row.try_get("agent_id").map_err(row_err)?,
        title: row.try_get("title").map_err(row_err)?,
        created_at: row.try_get("created_at").map_err(row_err)?,
        updated_at: row.try_get("updated_at").map_err(row_err)?,
    })
}

fn message_from_row(row: &PgRow) -> Result<Message, StorageError> {
    let role: String = row.try_get("role").map_err(row_err)?;
    let role = MessageRole::parse(&role)
        .ok_or_else(|| StorageError::Other(format!("Unknown message role: {}", role)))?;
    Ok(Message {
        id: row.try_get("id").map_err(row_err)?,
        conversation_id: row.try_get("conversation_id").map_err(row_err)?,
        owner_id: row.try_get("owner_id").map_err(row_err)?,
        role,
        content: row.try_get("content").map_err(row_err)?,
        created_at: row.try_get("created_at").map_err(row_err)?,
    })
}

fn attachment_from_row(row: &PgRow) -> Result<Attachment, StorageError> {
    Ok(Attachment {
        id: row.try_get("id").map_err(row_err)?,
        owner_id: row.try_get("owner_id").map_err(row_err)?,
        conversation_id: row.try_get("conversation_id").map_err(row_err)?,
        file_name: row.try_get("file_name").map_err(row_err)?,
        content_type: row.try_get("content_type").map_err(row_err)?,
        storage_path: row.try_get("storage_path").map_err(row_err)?,
        size_bytes: row.try_get("size_bytes").map_err(row_err)?,
        created_at: row.try_get("created_at").map_err(row_err)?,
    })
}

fn business_profile_from_row(row: &PgRow) -> Result<BusinessProfile, StorageError> {
    let services: Json<Vec<String>> = row.try_get("services").map_err(row_err)?;
    Ok(BusinessProfile {
        id: row.try_get("id").map_err(row_err)?,
        owner_id: row.try_get("owner_id").map_err(row_err)?,
        business_name: row.try_get("business_name").map_err(row_err)?,
        industry: row.try_get("industry").map_err(row_err)?,
        description: row.try_get("description").map_err(row_err)?,
        website: row.try_get("website").map_err(row_err)?,
        tone: row.try_get("tone").map_err(row_err)?,
        services: services.0,
        target_audience: row.try_get("target_audience").map_err(row_err)?,
        updated_at: row.try_get("updated_at").map_err(row_err)?,
    })
}

fn wizard_state_from_row(row: &PgRow) -> Result<WizardState, StorageError> {
    let step: i16 = row.try_get("current_step").map_err(row_err)?;
    let services: Json<Vec<String>> = row.try_get("services").map_err(row_err)?;
    Ok(WizardState {
        owner_id: row.try_get("owner_id").map_err(row_err)?,
        current_step: step as u8,
        completed: row.try_get("completed").map_err(row_err)?,
        business_name: row.try_get("business_name").map_err(row_err)?,
        industry: row.try_get("industry").map_err(row_err)?,
        description: row.try_get("description").map_err(row_err)?,
        services: services.0,
        tone: row.try_get("tone").map_err(row_err)?,
        target_audience: row.try_get("target_audience").map_err(row_err)?,
        agent_name: row.try_get("agent_name").map_err(row_err)?,
        model: row.try_get("model").map_err(row_err)?,
        updated_at: row.try_get("updated_at").map_err(row_err)?,
    })
}

fn subscription_from_row(row: &PgRow) -> Result<Subscription, StorageError> {
    let plan: String = row.try_get("plan").map_err(row_err)?;
    let status: String = row.try_get("status").map_err(row_err)?;
    Ok(Subscription {
        id: row.try_get("id").map_err(row_err)?,
        owner_id: row.try_get("owner_id").map_err(row_err)?,
        plan: PlanTier::parse(&plan)
            .ok_or_else(|| StorageError::Other(format!("Unknown plan tier: {}", plan)))?,
        status: SubscriptionStatus::parse(&status)
            .ok_or_else(|| StorageError::Other(format!("Unknown subscription status: {}", status)))?,
        billing_customer_id: row.try_get("billing_customer_id").map_err(row_err)?,
        current_period_end: row.try_get("current_period_end").map_err(row_err)?,
        updated_at: row.try_get("updated_at").map_err(row_err)?,
    })
}

#[async_trait]
impl StorageBackend for PostgresStorageBackend {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(
            "SELECT id, email, display_name, provider_user_id, created_at FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn get_profile_by_provider_id(
        &self,
        provider_user_id: &str,
    ) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(
            "SELECT id, email, display_name, provider_user_id, created_at FROM profiles WHERE provider_user_id = $1",
        )
        .bind(provider_user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn create_profile(&self, profile: Profile) -> Result<Profile, StorageError> {
        sqlx::query(
            "INSERT INTO profiles (id, email, display_name, provider_user_id, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(&profile.provider_user_id)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(profile)
    }

    async fn create_agent(&self, agent: Agent) -> Result<Agent, StorageError> {
        sqlx::query(
            "INSERT INTO agents (id, owner_id, name, model, system_prompt, greeting, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(agent.id)
        .bind(agent.owner_id)
        .bind(&agent.name)
        .bind(&agent.model)
        .bind(&agent.system_prompt)
        .bind(&agent.greeting)
        .bind(agent.created_at)
        .bind(agent.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(agent)
    }

    async fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>, StorageError> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, model, system_prompt, greeting, created_at, updated_at
             FROM agents WHERE id = $1",
        )
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(agent_from_row).transpose()
    }

    async fn list_agents(&self, owner_id: Uuid) -> Result<Vec<Agent>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, model, system_prompt, greeting, created_at, updated_at
             FROM agents WHERE owner_id = $1 ORDER BY created_at",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(agent_from_row).collect()
    }

    async fn update_agent(&self, agent: Agent) -> Result<Agent, StorageError> {
        let result = sqlx::query(
            "UPDATE agents
             SET name = $2, model = $3, system_prompt = $4, greeting = $5, updated_at = $6
             WHERE id = $1",
        )
        .bind(agent.id)
        .bind(&agent.name)
        .bind(&agent.model)
        .bind(&agent.system_prompt)
        .bind(&agent.greeting)
        .bind(agent.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("agent", agent.id));
        }
        Ok(agent)
    }

    async fn delete_agent(&self, agent_id: Uuid) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM agents WHERE id = $1")
            .bind(agent_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("agent", agent_id));
        }
        Ok(())
    }

    async fn count_agents(&self, owner_id: Uuid) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agents WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(count)
    }

    async fn create_conversation(
        &self,
        conversation: Conversation,
    ) -> Result<Conversation, StorageError> {
        sqlx::query(
            "INSERT INTO conversations (id, owner_id, agent_id, title, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(conversation.id)
        .bind(conversation.owner_id)
        .bind(conversation.agent_id)
        .bind(&conversation.title)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, StorageError> {
        let row = sqlx::query(
            "SELECT id, owner_id, agent_id, title, created_at, updated_at
             FROM conversations WHERE id = $1",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(conversation_from_row).transpose()
    }

    async fn list_conversations(
        &self,
        owner_id: Uuid,
        agent_id: Option<Uuid>,
    ) -> Result<Vec<Conversation>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, agent_id, title, created_at, updated_at
             FROM conversations
             WHERE owner_id = $1 AND ($2::uuid IS NULL OR agent_id = $2)
             ORDER BY created_at",
        )
        .bind(owner_id)
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(conversation_from_row).collect()
    }

    async fn delete_conversation(&self, conversation_id: Uuid) -> Result<(), StorageError> {
        // Messages cascade via FK
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(conversation_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("conversation", conversation_id));
        }
        Ok(())
    }

    async fn append_message(&self, message: Message) -> Result<Message, StorageError> {
        sqlx::query(
            "INSERT INTO messages (id, conversation_id, owner_id, role, content, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(message.owner_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(message)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, conversation_id, owner_id, role, content, created_at
             FROM messages WHERE conversation_id = $1 ORDER BY created_at",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(message_from_row).collect()
    }

    async fn count_messages_since(
        &self,
        owner_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE owner_id = $1 AND created_at >= $2",
        )
        .bind(owner_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(count)
    }

    async fn create_attachment(&self, attachment: Attachment) -> Result<Attachment, StorageError> {
        sqlx::query(
            "INSERT INTO attachments (id, owner_id, conversation_id, file_name, content_type, storage_path, size_bytes, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(attachment.id)
        .bind(attachment.owner_id)
        .bind(attachment.conversation_id)
        .bind(&attachment.file_name)
        .bind(&attachment.content_type)
        .bind(&attachment.storage_path)
        .bind(attachment.size_bytes)
        .bind(attachment.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(attachment)
    }

    async fn get_attachment(
        &self,
        attachment_id: Uuid,
    ) -> Result<Option<Attachment>, StorageError> {
        let row = sqlx::query(
            "SELECT id, owner_id, conversation_id, file_name, content_type, storage_path, size_bytes, created_at
             FROM attachments WHERE id = $1",
        )
        .bind(attachment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(attachment_from_row).transpose()
    }

    async fn list_attachments(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Attachment>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, conversation_id, file_name, content_type, storage_path, size_bytes, created_at
             FROM attachments WHERE conversation_id = $1 ORDER BY created_at",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(attachment_from_row).collect()
    }

    async fn get_business_profile(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<BusinessProfile>, StorageError> {
        let row = sqlx::query(
            "SELECT id, owner_id, business_name, industry, description, website, tone, services, target_audience, updated_at
             FROM business_profiles WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(business_profile_from_row).transpose()
    }

    async fn upsert_business_profile(
        &self,
        profile: BusinessProfile,
    ) -> Result<BusinessProfile, StorageError> {
        sqlx::query(
            "INSERT INTO business_profiles (id, owner_id, business_name, industry, description, website, tone, services, target_audience, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (owner_id) DO UPDATE SET
                business_name = $3, industry = $4, description = $5, website = $6,
                tone = $7, services = $8, target_audience = $9, updated_at = $10",
        )
        .bind(profile.id)
        .bind(profile.owner_id)
        .bind(&profile.business_name)
        .bind(&profile.industry)
        .bind(&profile.description)
        .bind(&profile.website)
        .bind(&profile.tone)
        .bind(Json(&profile.services))
        .bind(&profile.target_audience)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(profile)
    }

    async fn get_wizard_state(&self, owner_id: Uuid) -> Result<Option<WizardState>, StorageError> {
        let row = sqlx::query(
            "SELECT owner_id, current_step, completed, business_name, industry, description, services, tone, target_audience, agent_name, model, updated_at
             FROM wizard_states WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(wizard_state_from_row).transpose()
    }

    async fn upsert_wizard_state(&self, state: WizardState) -> Result<WizardState, StorageError> {
        sqlx::query(
            "INSERT INTO wizard_states (owner_id, current_step, completed, business_name, industry, description, services, tone, target_audience, agent_name, model, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT (owner_id) DO UPDATE SET
                current_step = $2, completed = $3, business_name = $4, industry = $5,
                description = $6, services = $7, tone = $8, target_audience = $9,
                agent_name = $10, model = $11, updated_at = $12",
        )
        .bind(state.owner_id)
        .bind(state.current_step as i16)
        .bind(state.completed)
        .bind(&state.business_name)
        .bind(&state.industry)
        .bind(&state.description)
        .bind(Json(&state.services))
        .bind(&state.tone)
        .bind(&state.target_audience)
        .bind(&state.agent_name)
        .bind(&state.model)
        .bind(state.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(state)
    }

    async fn get_subscription(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<Subscription>, StorageError> {
        let row = sqlx::query(
            "SELECT id, owner_id, plan, status, billing_customer_id, current_period_end, updated_at
             FROM subscriptions WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(subscription_from_row).transpose()
    }

    async fn upsert_subscription(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, StorageError> {
        sqlx::query(
            "INSERT INTO subscriptions (id, owner_id, plan, status, billing_customer_id, current_period_end, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (owner_id) DO UPDATE SET
                plan = $3, status = $4, billing_customer_id = $5,
                current_period_end = $6, updated_at = $7",
        )
        .bind(subscription.id)
        .bind(subscription.owner_id)
        .bind(subscription.plan.as_str())
        .bind(subscription.status.as_str())
        .bind(&subscription.billing_customer_id)
        .bind(subscription.current_period_end)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(subscription)
    }
}
