//! Services module - clients for the external managed services plus the
//! prompt templating used by onboarding.

pub mod billing_service;
pub mod identity_service;
pub mod jwt_service;
pub mod prompt_service;
pub mod signed_url_service;

// Re-export for convenience
pub use billing_service::BillingService;
pub use identity_service::{IdentityService, ProviderUser};
pub use jwt_service::{Claims, JwtService, SharedJwtService, TokenPair, TokenType};
pub use prompt_service::generate_system_prompt;
pub use signed_url_service::{SignedUrl, SignedUrlService};
