// Models module - plain records passed through to the managed database

pub mod agent;
pub mod attachment;
pub mod business_profile;
pub mod conversation;
pub mod enums;
pub mod onboarding;
pub mod profile;
pub mod subscription;

pub use agent::Agent;
pub use attachment::Attachment;
pub use business_profile::BusinessProfile;
pub use conversation::{Conversation, Message};
pub use enums::{MessageRole, PlanTier, SubscriptionStatus};
pub use onboarding::{WizardState, WizardUpdate, TOTAL_STEPS};
pub use profile::Profile;
pub use subscription::{PlanLimits, Subscription};
