use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Application-side user record, keyed to the identity provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Subject id issued by the hosted identity provider.
    pub provider_user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(email: String, provider_user_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            display_name: None,
            provider_user_id,
            created_at: Utc::now(),
        }
    }
}
