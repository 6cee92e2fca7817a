mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{Call, FakeApi};
use eval_planner_client::agents::AgentForm;
use eval_planner_client::error::ClientError;
use eval_planner_client::store::ResourceStore;
use eval_planner_core::agent::{Agent, DEFAULT_AUTH_CONFIG_TEXT};
use serde_json::json;

fn form(api: &Arc<FakeApi>) -> (AgentForm, Arc<ResourceStore<Agent>>) {
    let agents = Arc::new(ResourceStore::<Agent>::new(api.clone()));
    (AgentForm::new(api.clone(), Arc::clone(&agents)), agents)
}

fn fill(form: &mut AgentForm, auth_config: &str) {
    form.update_draft(|d| {
        d.name = "Staging".to_string();
        d.url = "https://staging.example.com".to_string();
        d.auth_config_text = auth_config.to_string();
    })
    .unwrap();
}

// ---------------------------------------------------------------------------
// Test: registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_object_auth_config_is_posted_as_an_object() {
    let api = Arc::new(FakeApi::default());
    let (mut agent_form, agents) = form(&api);

    agent_form.open();
    fill(&mut agent_form, "{}");
    let created = agent_form.submit().await.unwrap();

    assert_eq!(
        api.calls(),
        vec![
            Call::CreateAgent(json!({
                "name": "Staging",
                "url": "https://staging.example.com",
                "auth_config": {},
            })),
            Call::ListAgents,
        ]
    );
    assert!(!agent_form.is_open());
    assert_eq!(agents.find(&created.id).await.unwrap().name, "Staging");
}

#[tokio::test]
async fn form_opens_with_bearer_template() {
    let api = Arc::new(FakeApi::default());
    let (mut agent_form, _agents) = form(&api);

    assert!(agent_form.draft().is_none());
    agent_form.open();

    let draft = agent_form.draft().unwrap();
    assert_eq!(draft.auth_config_text, DEFAULT_AUTH_CONFIG_TEXT);
    assert!(draft.name.is_empty());
}

// ---------------------------------------------------------------------------
// Test: local validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_auth_config_blocks_the_request() {
    let api = Arc::new(FakeApi::default());
    let (mut agent_form, _agents) = form(&api);

    agent_form.open();
    fill(&mut agent_form, "{invalid");
    let err = agent_form.submit().await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(api.count(Call::is_create_agent), 0);
    assert!(agent_form.is_open());
    assert_eq!(agent_form.draft().unwrap().auth_config_text, "{invalid");
    assert!(agent_form
        .last_error()
        .unwrap()
        .starts_with("Error registering agent:"));
}

#[tokio::test]
async fn missing_url_blocks_the_request() {
    let api = Arc::new(FakeApi::default());
    let (mut agent_form, _agents) = form(&api);

    agent_form.open();
    fill(&mut agent_form, "{}");
    agent_form.update_draft(|d| d.url = "   ".to_string()).unwrap();

    assert!(agent_form.submit().await.unwrap_err().is_validation());
    assert!(api.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Test: backend failure and closed form
// ---------------------------------------------------------------------------

#[tokio::test]
async fn backend_failure_keeps_the_form_open() {
    let api = Arc::new(FakeApi::default());
    let (mut agent_form, agents) = form(&api);

    agent_form.open();
    fill(&mut agent_form, "{}");
    api.fail_mutations(true);

    assert_matches!(agent_form.submit().await, Err(ClientError::Api(_)));
    assert!(agent_form.is_open());
    assert_eq!(agent_form.draft().unwrap().name, "Staging");
    assert!(agents.is_empty().await);
}

#[tokio::test]
async fn closed_form_rejects_edits_and_submits() {
    let api = Arc::new(FakeApi::default());
    let (mut agent_form, _agents) = form(&api);

    assert_matches!(
        agent_form.update_draft(|d| d.name = "x".to_string()),
        Err(ClientError::NothingToSubmit(_))
    );
    assert_matches!(agent_form.submit().await, Err(ClientError::NothingToSubmit(_)));

    agent_form.open();
    agent_form.close();
    assert!(!agent_form.is_open());
    assert!(api.calls().is_empty());
}
