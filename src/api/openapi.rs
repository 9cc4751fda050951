//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Authentication
        crate::api::routes::auth::initiate_login,
        crate::api::routes::auth::handle_callback,
        crate::api::routes::auth::refresh_token,
        crate::api::routes::auth::get_auth_status,
        crate::api::routes::auth::logout,
        // Agents
        crate::api::routes::agents::list_agents,
        crate::api::routes::agents::create_agent,
        crate::api::routes::agents::get_agent,
        crate::api::routes::agents::update_agent,
        crate::api::routes::agents::delete_agent,
        // Conversations
        crate::api::routes::conversations::list_conversations,
        crate::api::routes::conversations::create_conversation,
        crate::api::routes::conversations::get_conversation,
        crate::api::routes::conversations::delete_conversation,
        crate::api::routes::conversations::append_message,
        crate::api::routes::conversations::list_messages,
        // Attachments
        crate::api::routes::attachments::create_attachment,
        crate::api::routes::attachments::list_attachments,
        crate::api::routes::attachments::get_signed_url,
        // Business profile
        crate::api::routes::business_profile::get_business_profile,
        crate::api::routes::business_profile::upsert_business_profile,
        // Onboarding
        crate::api::routes::onboarding::get_wizard_state,
        crate::api::routes::onboarding::update_wizard_state,
        crate::api::routes::onboarding::advance_step,
        crate::api::routes::onboarding::back_step,
        crate::api::routes::onboarding::complete_onboarding,
        // Billing
        crate::api::routes::billing::create_checkout,
        crate::api::routes::billing::create_portal,
        crate::api::routes::billing::get_subscription,
        // OpenAPI
        crate::api::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::Agent,
        crate::models::Conversation,
        crate::models::Message,
        crate::models::Attachment,
        crate::models::BusinessProfile,
        crate::models::WizardState,
        crate::models::WizardUpdate,
        crate::models::Subscription,
        crate::models::PlanLimits,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Identity provider login and session management"),
        (name = "Agents", description = "Agent configuration CRUD"),
        (name = "Conversations", description = "Conversations and message transcripts"),
        (name = "Attachments", description = "Attachment metadata and signed URLs"),
        (name = "BusinessProfile", description = "Per-user business profile"),
        (name = "Onboarding", description = "Guided setup wizard"),
        (name = "Billing", description = "Checkout, portal, and subscription state"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "AgentDesk API",
        description = "REST API for configuring AI support agents, conversations, and billing",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081/api/v1", description = "Local development server"),
        (url = "https://api.example.com/api/v1", description = "Production server")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Keep the advertised version in step with Cargo.toml
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

        if openapi.components.is_none() {
            openapi.components = Some(utoipa::openapi::Components::new());
        }

        let components = match openapi.components.as_mut() {
            Some(components) => components,
            None => return,
        };
        use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
