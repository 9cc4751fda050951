use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::{PlanTier, SubscriptionStatus};

/// Per-plan usage entitlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlanLimits {
    pub max_agents: u32,
    pub max_messages_per_month: u32,
}

impl PlanTier {
    /// Entitlements for this tier. Kept in code rather than the database so
    /// the limits query needs no extra round trip.
    pub fn limits(&self) -> PlanLimits {
        match self {
            PlanTier::Free => PlanLimits {
                max_agents: 1,
                max_messages_per_month: 100,
            },
            PlanTier::Starter => PlanLimits {
                max_agents: 3,
                max_messages_per_month: 2_000,
            },
            PlanTier::Pro => PlanLimits {
                max_agents: 10,
                max_messages_per_month: 20_000,
            },
        }
    }
}

/// Mirror of the payments provider's subscription state for one user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub plan: PlanTier,
    pub status: SubscriptionStatus,
    /// Customer id at the payments provider (absent until first checkout).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Default free-tier subscription for a user with no billing history.
    pub fn free(owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            plan: PlanTier::Free,
            status: SubscriptionStatus::Active,
            billing_customer_id: None,
            current_period_end: None,
            updated_at: Utc::now(),
        }
    }
}
