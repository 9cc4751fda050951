use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Number of steps in the onboarding wizard.
///
/// 1: business basics, 2: services offered, 3: tone & audience,
/// 4: agent identity, 5: review.
pub const TOTAL_STEPS: u8 = 5;

/// Server-side copy of the onboarding wizard's form state.
///
/// A linear step counter plus the answers collected so far. Updates are
/// partial (only the provided fields change); completion validates the
/// required answers and is handled by the onboarding routes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WizardState {
    pub owner_id: Uuid,
    pub current_step: u8,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to a [`WizardState`]. Absent fields are untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WizardUpdate {
    pub business_name: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub services: Option<Vec<String>>,
    pub tone: Option<String>,
    pub target_audience: Option<String>,
    pub agent_name: Option<String>,
    pub model: Option<String>,
}

impl WizardState {
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            current_step: 1,
            completed: false,
            business_name: None,
            industry: None,
            description: None,
            services: Vec::new(),
            tone: None,
            target_audience: None,
            agent_name: None,
            model: None,
            updated_at: Utc::now(),
        }
    }

    /// Merge a partial update into the state.
    pub fn apply(&mut self, update: WizardUpdate) {
        if let Some(v) = update.business_name {
            self.business_name = Some(v);
        }
        if let Some(v) = update.industry {
            self.industry = Some(v);
        }
        if let Some(v) = update.description {
            self.description = Some(v);
        }
        if let Some(v) = update.services {
            self.services = v;
        }
        if let Some(v) = update.tone {
            self.tone = Some(v);
        }
        if let Some(v) = update.target_audience {
            self.target_audience = Some(v);
        }
        if let Some(v) = update.agent_name {
            self.agent_name = Some(v);
        }
        if let Some(v) = update.model {
            self.model = Some(v);
        }
        self.updated_at = Utc::now();
    }

    /// Move to the next step, clamping at the last one.
    pub fn advance(&mut self) {
        if self.current_step < TOTAL_STEPS {
            self.current_step += 1;
            self.updated_at = Utc::now();
        }
    }

    /// Move to the previous step, clamping at the first one.
    pub fn back(&mut self) {
        if self.current_step > 1 {
            self.current_step -= 1;
            self.updated_at = Utc::now();
        }
    }

    /// Answers that must be present before the wizard can complete.
    /// Returns the first missing field name for the 400 message.
    pub fn missing_required_field(&self) -> Option<&'static str> {
        if self.business_name.as_deref().unwrap_or("").trim().is_empty() {
            return Some("business_name");
        }
        if self.agent_name.as_deref().unwrap_or("").trim().is_empty() {
            return Some("agent_name");
        }
        if self.model.as_deref().unwrap_or("").trim().is_empty() {
            return Some("model");
        }
        None
    }
}
