#![allow(dead_code)]

//! Shared test fixtures: an in-memory [`FakeApi`] backend and entity
//! builders.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use eval_planner_client::api::{ApiError, ApiResult, EvalApi};
use eval_planner_core::agent::{Agent, NewAgent};
use eval_planner_core::job::{Job, JobStatus, NewJob};
use eval_planner_core::rule::{Rule, RuleDraft, RuleType};
use serde_json::Value;
use tokio::sync::oneshot;

/// One call received by the fake backend. Bodies are recorded as the JSON
/// that would have gone over the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListRules,
    CreateRule(Value),
    UpdateRule(String, Value),
    DeleteRule(String),
    ListAgents,
    CreateAgent(Value),
    ListJobs,
    CreateJob(Value),
}

impl Call {
    pub fn is_list_jobs(&self) -> bool {
        matches!(self, Call::ListJobs)
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::ListRules | Call::ListAgents | Call::ListJobs)
    }

    pub fn is_create_job(&self) -> bool {
        matches!(self, Call::CreateJob(_))
    }

    pub fn is_create_agent(&self) -> bool {
        matches!(self, Call::CreateAgent(_))
    }
}

#[derive(Default)]
struct ServerState {
    rules: Vec<Rule>,
    agents: Vec<Agent>,
    jobs: Vec<Job>,
}

/// In-memory stand-in for the backend.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<ServerState>,
    calls: Mutex<Vec<Call>>,
    fail_lists: AtomicBool,
    fail_mutations: AtomicBool,
    /// Pending responses for upcoming `list_jobs` calls, consumed in order.
    job_list_gates: Mutex<VecDeque<oneshot::Receiver<Vec<Job>>>>,
}

fn injected() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "injected failure".to_string(),
    }
}

fn not_found(entity: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!("{entity} not found"),
    }
}

impl FakeApi {
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().rules = rules;
        api
    }

    pub fn set_rules(&self, rules: Vec<Rule>) {
        self.state.lock().unwrap().rules = rules;
    }

    pub fn set_agents(&self, agents: Vec<Agent>) {
        self.state.lock().unwrap().agents = agents;
    }

    pub fn set_jobs(&self, jobs: Vec<Job>) {
        self.state.lock().unwrap().jobs = jobs;
    }

    pub fn server_rules(&self) -> Vec<Rule> {
        self.state.lock().unwrap().rules.clone()
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Make the next unscripted `list_jobs` call wait for the returned
    /// sender. Dropping the sender makes that call fail.
    pub fn script_job_list(&self) -> oneshot::Sender<Vec<Job>> {
        let (tx, rx) = oneshot::channel();
        self.job_list_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_lists(&self) -> ApiResult<()> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(())
    }

    fn check_mutations(&self) -> ApiResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(())
    }
}

#[async_trait]
impl EvalApi for FakeApi {
    async fn list_rules(&self) -> ApiResult<Vec<Rule>> {
        self.record(Call::ListRules);
        self.check_lists()?;
        Ok(self.state.lock().unwrap().rules.clone())
    }

    async fn create_rule(&self, draft: &RuleDraft) -> ApiResult<Rule> {
        self.record(Call::CreateRule(
            serde_json::to_value(draft.payload()).unwrap(),
        ));
        self.check_mutations()?;
        let now = Utc::now();
        let rule = Rule {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name.clone(),
            description: Some(draft.description.clone()).filter(|d| !d.is_empty()),
            code_content: draft.code_content.clone(),
            rule_type: draft.rule_type.clone(),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().rules.push(rule.clone());
        Ok(rule)
    }

    async fn update_rule(&self, id: &str, draft: &RuleDraft) -> ApiResult<Rule> {
        self.record(Call::UpdateRule(
            id.to_string(),
            serde_json::to_value(draft.payload()).unwrap(),
        ));
        self.check_mutations()?;
        let mut state = self.state.lock().unwrap();
        let rule = state
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("Rule"))?;
        rule.name = draft.name.clone();
        rule.description = Some(draft.description.clone()).filter(|d| !d.is_empty());
        rule.code_content = draft.code_content.clone();
        rule.rule_type = draft.rule_type.clone();
        rule.updated_at = Utc::now();
        Ok(rule.clone())
    }

    async fn delete_rule(&self, id: &str) -> ApiResult<()> {
        self.record(Call::DeleteRule(id.to_string()));
        self.check_mutations()?;
        let mut state = self.state.lock().unwrap();
        let before = state.rules.len();
        state.rules.retain(|r| r.id != id);
        if state.rules.len() == before {
            return Err(not_found("Rule"));
        }
        Ok(())
    }

    async fn list_agents(&self) -> ApiResult<Vec<Agent>> {
        self.record(Call::ListAgents);
        self.check_lists()?;
        Ok(self.state.lock().unwrap().agents.clone())
    }

    async fn create_agent(&self, agent: &NewAgent) -> ApiResult<Agent> {
        self.record(Call::CreateAgent(serde_json::to_value(agent).unwrap()));
        self.check_mutations()?;
        let created = Agent {
            id: uuid::Uuid::new_v4().to_string(),
            name: agent.name.clone(),
            url: agent.url.clone(),
            auth_config: agent.auth_config.clone(),
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().agents.push(created.clone());
        Ok(created)
    }

    async fn list_jobs(&self) -> ApiResult<Vec<Job>> {
        self.record(Call::ListJobs);
        self.check_lists()?;
        let gate = self.job_list_gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.map_err(|_| injected()),
            None => Ok(self.state.lock().unwrap().jobs.clone()),
        }
    }

    async fn create_job(&self, job: &NewJob) -> ApiResult<Job> {
        self.record(Call::CreateJob(serde_json::to_value(job).unwrap()));
        self.check_mutations()?;
        let created = Job {
            id: uuid::Uuid::new_v4().to_string(),
            status: JobStatus::Pending,
            rule_id: Some(job.rule_id.clone()),
            agent_id: Some(job.agent_id.clone()),
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().jobs.push(created.clone());
        Ok(created)
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn rule(id: &str, name: &str) -> Rule {
    let now = Utc::now();
    Rule {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        code_content: format!("# {name}"),
        rule_type: RuleType::Python,
        created_at: now,
        updated_at: now,
    }
}

pub fn agent(id: &str, name: &str) -> Agent {
    Agent {
        id: id.to_string(),
        name: name.to_string(),
        url: format!("http://{name}.test"),
        auth_config: serde_json::json!({}),
        created_at: Utc::now(),
    }
}

pub fn job(id: &str, status: &str) -> Job {
    Job {
        id: id.to_string(),
        status: JobStatus::from(status.to_string()),
        rule_id: None,
        agent_id: None,
        created_at: Utc::now(),
    }
}

pub fn ids<T>(items: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
    items.iter().map(|item| id(item).to_string()).collect()
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
