use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Business details collected during onboarding and editable afterwards.
///
/// One profile per user; writes go through an upsert.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BusinessProfile {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub business_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessProfile {
    pub fn new(owner_id: Uuid, business_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            business_name,
            industry: None,
            description: None,
            website: None,
            tone: None,
            services: Vec::new(),
            target_audience: None,
            updated_at: Utc::now(),
        }
    }
}
