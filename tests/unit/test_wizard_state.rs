//! Unit tests for the onboarding wizard state machine.

use agentdesk_api::models::{TOTAL_STEPS, WizardState, WizardUpdate};
use uuid::Uuid;

fn filled_state() -> WizardState {
    let mut state = WizardState::new(Uuid::new_v4());
    state.apply(WizardUpdate {
        business_name: Some("Acme Plumbing".to_string()),
        agent_name: Some("Mario".to_string()),
        model: Some("gpt-4o-mini".to_string()),
        ..Default::default()
    });
    state
}

#[test]
fn test_new_state_starts_at_step_one() {
    let state = WizardState::new(Uuid::new_v4());
    assert_eq!(state.current_step, 1);
    assert!(!state.completed);
    assert!(state.business_name.is_none());
    assert!(state.services.is_empty());
}

#[test]
fn test_advance_clamps_at_last_step() {
    let mut state = WizardState::new(Uuid::new_v4());
    for _ in 0..(TOTAL_STEPS + 3) {
        state.advance();
    }
    assert_eq!(state.current_step, TOTAL_STEPS);
}

#[test]
fn test_back_clamps_at_first_step() {
    let mut state = WizardState::new(Uuid::new_v4());
    state.back();
    state.back();
    assert_eq!(state.current_step, 1);

    state.advance();
    state.back();
    assert_eq!(state.current_step, 1);
}

#[test]
fn test_apply_only_touches_provided_fields() {
    let mut state = WizardState::new(Uuid::new_v4());
    state.apply(WizardUpdate {
        business_name: Some("Acme".to_string()),
        ..Default::default()
    });
    state.apply(WizardUpdate {
        tone: Some("friendly".to_string()),
        ..Default::default()
    });

    assert_eq!(state.business_name.as_deref(), Some("Acme"));
    assert_eq!(state.tone.as_deref(), Some("friendly"));
    assert!(state.agent_name.is_none());
}

#[test]
fn test_apply_replaces_services_wholesale() {
    let mut state = WizardState::new(Uuid::new_v4());
    state.apply(WizardUpdate {
        services: Some(vec!["repairs".to_string(), "installs".to_string()]),
        ..Default::default()
    });
    state.apply(WizardUpdate {
        services: Some(vec!["repairs".to_string()]),
        ..Default::default()
    });

    assert_eq!(state.services, vec!["repairs".to_string()]);
}

#[test]
fn test_missing_required_fields_reported_in_order() {
    let mut state = WizardState::new(Uuid::new_v4());
    assert_eq!(state.missing_required_field(), Some("business_name"));

    state.apply(WizardUpdate {
        business_name: Some("Acme".to_string()),
        ..Default::default()
    });
    assert_eq!(state.missing_required_field(), Some("agent_name"));

    state.apply(WizardUpdate {
        agent_name: Some("Mario".to_string()),
        ..Default::default()
    });
    assert_eq!(state.missing_required_field(), Some("model"));

    state.apply(WizardUpdate {
        model: Some("gpt-4o-mini".to_string()),
        ..Default::default()
    });
    assert_eq!(state.missing_required_field(), None);
}

#[test]
fn test_blank_answers_count_as_missing() {
    let mut state = filled_state();
    state.apply(WizardUpdate {
        business_name: Some("   ".to_string()),
        ..Default::default()
    });
    assert_eq!(state.missing_required_field(), Some("business_name"));
}

#[test]
fn test_filled_state_is_complete_ready() {
    let state = filled_state();
    assert_eq!(state.missing_required_field(), None);
    assert!(!state.completed);
}
