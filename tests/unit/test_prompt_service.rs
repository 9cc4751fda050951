//! Unit tests for prompt generation from wizard answers.

use agentdesk_api::models::{WizardState, WizardUpdate};
use agentdesk_api::services::prompt_service::{generate_greeting, generate_system_prompt};
use uuid::Uuid;

fn wizard_with(update: WizardUpdate) -> WizardState {
    let mut state = WizardState::new(Uuid::new_v4());
    state.apply(update);
    state
}

#[test]
fn test_prompt_opens_with_agent_and_business() {
    let state = wizard_with(WizardUpdate {
        business_name: Some("Northside Dental".to_string()),
        agent_name: Some("Pearl".to_string()),
        model: Some("gpt-4o-mini".to_string()),
        ..Default::default()
    });

    let prompt = generate_system_prompt(&state);
    assert!(prompt.starts_with("You are Pearl, the AI assistant for Northside Dental."));
}

#[test]
fn test_prompt_lists_each_service_once() {
    let state = wizard_with(WizardUpdate {
        business_name: Some("Acme".to_string()),
        agent_name: Some("Bot".to_string()),
        services: Some(vec![
            "Teeth cleaning".to_string(),
            "Whitening".to_string(),
            "Implants".to_string(),
        ]),
        ..Default::default()
    });

    let prompt = generate_system_prompt(&state);
    assert!(prompt.contains("Services offered:"));
    assert_eq!(prompt.matches("- Teeth cleaning").count(), 1);
    assert_eq!(prompt.matches("- Whitening").count(), 1);
    assert_eq!(prompt.matches("- Implants").count(), 1);
}

#[test]
fn test_prompt_default_tone_when_unset() {
    let state = wizard_with(WizardUpdate {
        business_name: Some("Acme".to_string()),
        agent_name: Some("Bot".to_string()),
        ..Default::default()
    });

    let prompt = generate_system_prompt(&state);
    assert!(prompt.contains("friendly and professional"));
}

#[test]
fn test_prompt_custom_tone_overrides_default() {
    let state = wizard_with(WizardUpdate {
        business_name: Some("Acme".to_string()),
        agent_name: Some("Bot".to_string()),
        tone: Some("formal".to_string()),
        ..Default::default()
    });

    let prompt = generate_system_prompt(&state);
    assert!(prompt.contains("formal tone"));
    assert!(!prompt.contains("friendly and professional"));
}

#[test]
fn test_prompt_constrains_to_business_topics() {
    let state = wizard_with(WizardUpdate {
        business_name: Some("Acme".to_string()),
        agent_name: Some("Bot".to_string()),
        ..Default::default()
    });

    let prompt = generate_system_prompt(&state);
    assert!(prompt.contains("Only answer questions related to Acme"));
}

#[test]
fn test_greeting_uses_agent_and_business_names() {
    let state = wizard_with(WizardUpdate {
        business_name: Some("Acme".to_string()),
        agent_name: Some("Bot".to_string()),
        ..Default::default()
    });

    let greeting = generate_greeting(&state);
    assert_eq!(greeting, "Hi! I'm Bot from Acme. How can I help you today?");
}

#[test]
fn test_greeting_falls_back_to_generic_names() {
    let state = WizardState::new(Uuid::new_v4());
    let greeting = generate_greeting(&state);
    assert!(greeting.contains("your assistant"));
    assert!(greeting.contains("our business"));
}
