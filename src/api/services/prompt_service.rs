//! System-prompt generation from onboarding answers.
//!
//! Pure string templating over the wizard's fixed answer schema. The prompt
//! is stored on the agent at creation and editable afterwards like any other
//! field.

use crate::models::WizardState;

/// Render an agent system prompt from completed wizard answers.
///
/// Callers are expected to have validated the required fields
/// (`WizardState::missing_required_field`) first; absent optional answers
/// simply produce a shorter prompt.
pub fn generate_system_prompt(state: &WizardState) -> String {
    let business_name = state.business_name.as_deref().unwrap_or("the business");
    let agent_name = state.agent_name.as_deref().unwrap_or("Assistant");

    let mut prompt = format!(
        "You are {agent_name}, the AI assistant for {business_name}."
    );

    if let Some(industry) = state.industry.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!(" {business_name} operates in the {industry} industry."));
    }

    if let Some(description) = state
        .description
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        prompt.push_str(&format!("\n\nAbout the business: {description}"));
    }

    if !state.services.is_empty() {
        prompt.push_str("\n\nServices offered:\n");
        for service in &state.services {
            prompt.push_str(&format!("- {service}\n"));
        }
    }

    if let Some(audience) = state
        .target_audience
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        prompt.push_str(&format!("\nYour typical customer: {audience}."));
    }

    let tone = state
        .tone
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("friendly and professional");
    prompt.push_str(&format!(
        "\n\nAlways answer in a {tone} tone. Only answer questions related to \
         {business_name} and its services. If you don't know something, say so \
         and offer to connect the customer with a human."
    ));

    prompt
}

/// Default greeting shown when a conversation starts.
pub fn generate_greeting(state: &WizardState) -> String {
    let business_name = state.business_name.as_deref().unwrap_or("our business");
    let agent_name = state.agent_name.as_deref().unwrap_or("your assistant");
    format!("Hi! I'm {agent_name} from {business_name}. How can I help you today?")
}
