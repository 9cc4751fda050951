//! Integration tests for conversation and message routes.

#[path = "../common/mod.rs"]
mod common;

use agentdesk_api::models::{Message, MessageRole, PlanTier};
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

async fn create_agent(server: &axum_test::TestServer, token: &str) -> String {
    let (name, value) = common::auth_header(token);
    let response = server
        .post("/agents")
        .add_header(name, value)
        .json(&json!({ "name": "Bot", "model": "gpt-4o-mini" }))
        .await;
    response.json::<Value>()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_create_conversation_for_owned_agent() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state);
    let agent_id = create_agent(&server, &token).await;

    let (name, value) = common::auth_header(&token);
    let response = server
        .post("/conversations")
        .add_header(name, value)
        .json(&json!({ "agent_id": agent_id, "title": "Pricing question" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["agent_id"], agent_id.as_str());
    assert_eq!(body["data"]["title"], "Pricing question");
}

#[tokio::test]
async fn test_create_conversation_rejects_foreign_or_missing_agent() {
    let state = common::test_state();
    let (_alice, alice_token) = common::signed_in_user(&state, "alice@example.com").await;
    let (_bob, bob_token) = common::signed_in_user(&state, "bob@example.com").await;
    let server = common::test_server(state);
    let alice_agent = create_agent(&server, &alice_token).await;

    let (name, value) = common::auth_header(&bob_token);
    let response = server
        .post("/conversations")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "agent_id": alice_agent }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .post("/conversations")
        .add_header(name, value)
        .json(&json!({ "agent_id": Uuid::new_v4() }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_conversations_filters_by_agent() {
    let state = common::test_state();
    let (profile, token) = common::signed_in_user(&state, "owner@example.com").await;

    // Starter plan so two agents fit
    let mut subscription = agentdesk_api::models::Subscription::free(profile.id);
    subscription.plan = PlanTier::Starter;
    state.storage.upsert_subscription(subscription).await.unwrap();

    let server = common::test_server(state);
    let agent_a = create_agent(&server, &token).await;
    let agent_b = create_agent(&server, &token).await;

    let (name, value) = common::auth_header(&token);
    for agent in [&agent_a, &agent_a, &agent_b] {
        server
            .post("/conversations")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "agent_id": agent }))
            .await;
    }

    let response = server
        .get("/conversations")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 3);

    let response = server
        .get(&format!("/conversations?agent_id={}", agent_a))
        .add_header(name, value)
        .await;
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_messages_append_and_list_in_order() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state);
    let agent_id = create_agent(&server, &token).await;

    let (name, value) = common::auth_header(&token);
    let response = server
        .post("/conversations")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "agent_id": agent_id }))
        .await;
    let conversation_id = response.json::<Value>()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    for (role, content) in [("user", "Hi"), ("assistant", "Hello!"), ("user", "Prices?")] {
        let response = server
            .post(&format!("/conversations/{}/messages", conversation_id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "role": role, "content": content }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let response = server
        .get(&format!("/conversations/{}/messages", conversation_id))
        .add_header(name, value)
        .await;
    let body: Value = response.json();
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["content"], "Hi");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[2]["content"], "Prices?");
}

#[tokio::test]
async fn test_append_message_validation() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state);
    let agent_id = create_agent(&server, &token).await;

    let (name, value) = common::auth_header(&token);
    let response = server
        .post("/conversations")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "agent_id": agent_id }))
        .await;
    let conversation_id = response.json::<Value>()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .post(&format!("/conversations/{}/messages", conversation_id))
        .add_header(name.clone(), value.clone())
        .json(&json!({ "role": "user", "content": "   " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post(&format!("/conversations/{}/messages", conversation_id))
        .add_header(name, value)
        .json(&json!({ "role": "system", "content": "hi" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "role must be 'user' or 'assistant'");
}

#[tokio::test]
async fn test_monthly_message_limit_enforced() {
    let state = common::test_state();
    let (profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state.clone());
    let agent_id = create_agent(&server, &token).await;

    let (name, value) = common::auth_header(&token);
    let response = server
        .post("/conversations")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "agent_id": agent_id }))
        .await;
    let conversation_id = response.json::<Value>()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let conversation_uuid: Uuid = conversation_id.parse().unwrap();

    // Fill this month's free-tier allowance directly in storage
    let limit = PlanTier::Free.limits().max_messages_per_month;
    for _ in 0..limit {
        state
            .storage
            .append_message(Message::new(
                conversation_uuid,
                profile.id,
                MessageRole::User,
                "x".to_string(),
            ))
            .await
            .unwrap();
    }

    let response = server
        .post(&format!("/conversations/{}/messages", conversation_id))
        .add_header(name, value)
        .json(&json!({ "role": "user", "content": "one more" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "Monthly message limit reached for current plan");
}

#[tokio::test]
async fn test_delete_conversation_removes_transcript() {
    let state = common::test_state();
    let (_profile, token) = common::signed_in_user(&state, "owner@example.com").await;
    let server = common::test_server(state);
    let agent_id = create_agent(&server, &token).await;

    let (name, value) = common::auth_header(&token);
    let response = server
        .post("/conversations")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "agent_id": agent_id }))
        .await;
    let conversation_id = response.json::<Value>()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .delete(&format!("/conversations/{}", conversation_id))
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get(&format!("/conversations/{}", conversation_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_foreign_conversation_is_403() {
    let state = common::test_state();
    let (_alice, alice_token) = common::signed_in_user(&state, "alice@example.com").await;
    let (_bob, bob_token) = common::signed_in_user(&state, "bob@example.com").await;
    let server = common::test_server(state);
    let agent_id = create_agent(&server, &alice_token).await;

    let (name, value) = common::auth_header(&alice_token);
    let response = server
        .post("/conversations")
        .add_header(name, value)
        .json(&json!({ "agent_id": agent_id }))
        .await;
    let conversation_id = response.json::<Value>()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (name, value) = common::auth_header(&bob_token);
    let response = server
        .get(&format!("/conversations/{}/messages", conversation_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}
