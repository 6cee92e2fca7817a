//! Agent registration form.

use std::sync::Arc;

use eval_planner_core::agent::{Agent, AgentDraft};
use eval_planner_core::form::FormBinder;

use crate::api::EvalApi;
use crate::error::{ClientError, ClientResult};
use crate::store::ResourceStore;

/// Registration dialog for new agents. Agents are create-only, so the form
/// is either closed or open with a mutable draft.
pub struct AgentForm {
    api: Arc<dyn EvalApi>,
    agents: Arc<ResourceStore<Agent>>,
    form: Option<FormBinder<AgentDraft>>,
    last_error: Option<String>,
}

impl AgentForm {
    pub fn new(api: Arc<dyn EvalApi>, agents: Arc<ResourceStore<Agent>>) -> Self {
        Self {
            api,
            agents,
            form: None,
            last_error: None,
        }
    }

    /// Open the form with a fresh default draft, replacing any open one.
    pub fn open(&mut self) {
        self.form = Some(FormBinder::mutable(AgentDraft::default()));
        self.last_error = None;
    }

    pub fn is_open(&self) -> bool {
        self.form.is_some()
    }

    pub fn draft(&self) -> Option<&AgentDraft> {
        self.form.as_ref().map(FormBinder::draft)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn update_draft(&mut self, edit: impl FnOnce(&mut AgentDraft)) -> ClientResult<()> {
        let form = self
            .form
            .as_mut()
            .ok_or(ClientError::NothingToSubmit("agent form"))?;
        form.update(edit)?;
        Ok(())
    }

    /// Close the form, discarding the draft.
    pub fn close(&mut self) {
        self.form = None;
        self.last_error = None;
    }

    /// Validate and submit the draft.
    ///
    /// The draft is taken out of the form while the request is in flight so
    /// a repeated submit cannot post twice. A local validation failure
    /// (empty field, malformed `auth_config`) makes no network call. On
    /// success the agent store is refreshed and the form closes; on any
    /// failure the form stays open with the draft unchanged.
    pub async fn submit(&mut self) -> ClientResult<Agent> {
        let form = self
            .form
            .take()
            .ok_or(ClientError::NothingToSubmit("agent form"))?;

        let result = match form.draft().to_request() {
            Ok(request) => self.api.create_agent(&request).await.map_err(ClientError::from),
            Err(e) => Err(ClientError::from(e)),
        };

        match result {
            Ok(agent) => {
                tracing::info!(agent_id = %agent.id, name = %agent.name, "Agent registered");
                self.agents.refresh().await;
                self.last_error = None;
                Ok(agent)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Registering agent failed");
                self.last_error = Some(e.user_message("registering agent"));
                self.form = Some(form);
                Err(e)
            }
        }
    }
}
