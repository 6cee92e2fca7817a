//! Top-level view switching and cross-resource job creation.
//!
//! [`TabController`] owns the stores, the per-view controllers and the
//! [`JobPoller`]. The poller is active exactly while the Jobs view is.

use std::sync::Arc;
use std::time::Duration;

use eval_planner_core::agent::Agent;
use eval_planner_core::job::{Job, JobDraft, JobRow};
use eval_planner_core::rule::Rule;

use crate::agents::AgentForm;
use crate::api::EvalApi;
use crate::error::{ClientError, ClientResult};
use crate::poller::JobPoller;
use crate::rules::SelectionController;
use crate::store::{RefreshOutcome, Stores};

/// The three top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Rules,
    Agents,
    Jobs,
}

/// Top-level controller: active view, stores, and cross-view actions.
pub struct TabController {
    api: Arc<dyn EvalApi>,
    stores: Stores,
    active: View,
    poller: JobPoller,
    rules: SelectionController,
    agent_form: AgentForm,
    job_dialog: Option<JobDraft>,
    job_error: Option<String>,
}

impl TabController {
    /// Create the controller with the Rules view active and the poller
    /// idle. Nothing is fetched until [`load_all`](Self::load_all).
    pub fn new(api: Arc<dyn EvalApi>, poll_period: Duration) -> Self {
        let stores = Stores::new(Arc::clone(&api));
        let poller = JobPoller::new(Arc::clone(&stores.jobs), poll_period);
        let rules = SelectionController::new(Arc::clone(&api), Arc::clone(&stores.rules));
        let agent_form = AgentForm::new(Arc::clone(&api), Arc::clone(&stores.agents));

        Self {
            api,
            stores,
            active: View::Rules,
            poller,
            rules,
            agent_form,
            job_dialog: None,
            job_error: None,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn active_view(&self) -> View {
        self.active
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    pub fn rules(&self) -> &SelectionController {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut SelectionController {
        &mut self.rules
    }

    pub fn agent_form(&self) -> &AgentForm {
        &self.agent_form
    }

    pub fn agent_form_mut(&mut self) -> &mut AgentForm {
        &mut self.agent_form
    }

    /// Initial load of every collection.
    pub async fn load_all(&self) -> [RefreshOutcome; 3] {
        self.stores.refresh_all().await
    }

    /// Switch the active view, starting or stopping the job poller as the
    /// Jobs view is entered or left. Switching to the current view is a
    /// no-op.
    pub fn switch_to(&mut self, view: View) {
        if view == self.active {
            return;
        }
        tracing::debug!(from = ?self.active, to = ?view, "Switching view");

        if self.active == View::Jobs {
            self.poller.deactivate();
        }
        self.active = view;
        if view == View::Jobs {
            self.poller.activate();
        }
    }

    // ---- job-creation dialog ----

    /// Open the job dialog with the given draft, replacing any open one.
    pub fn open_job_dialog(&mut self, draft: JobDraft) {
        self.job_dialog = Some(draft);
        self.job_error = None;
    }

    /// "Run" from a rule's detail view: dialog seeded with the rule.
    pub fn run_rule(&mut self, rule: &Rule) {
        self.open_job_dialog(JobDraft::for_rule(rule.id.clone()));
    }

    /// "Run" from an agent's row: dialog seeded with the agent.
    pub fn run_on_agent(&mut self, agent: &Agent) {
        self.open_job_dialog(JobDraft::for_agent(agent.id.clone()));
    }

    pub fn job_dialog(&self) -> Option<&JobDraft> {
        self.job_dialog.as_ref()
    }

    pub fn job_dialog_mut(&mut self) -> Option<&mut JobDraft> {
        self.job_dialog.as_mut()
    }

    pub fn job_error(&self) -> Option<&str> {
        self.job_error.as_deref()
    }

    /// Close the dialog, discarding its state.
    pub fn close_job_dialog(&mut self) {
        self.job_dialog = None;
        self.job_error = None;
    }

    /// Submit the job dialog.
    ///
    /// Makes no call unless both a rule and an agent are selected. The
    /// dialog is held out of the controller while the create request is in
    /// flight; on success it is discarded, the Jobs view becomes active and
    /// the job store is refreshed once. On failure the dialog is restored
    /// unchanged.
    pub async fn submit_job(&mut self) -> ClientResult<Job> {
        let draft = self
            .job_dialog
            .take()
            .ok_or(ClientError::NothingToSubmit("job dialog"))?;

        let result = match draft.to_request() {
            Ok(request) => self.api.create_job(&request).await.map_err(ClientError::from),
            Err(e) => Err(ClientError::from(e)),
        };

        match result {
            Ok(job) => {
                tracing::info!(
                    job_id = %job.id,
                    rule_id = ?job.rule_id,
                    agent_id = ?job.agent_id,
                    "Job created",
                );
                self.job_error = None;
                if self.active == View::Jobs {
                    self.stores.jobs.refresh().await;
                } else {
                    // Activation performs the refresh.
                    self.switch_to(View::Jobs);
                }
                Ok(job)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Creating job failed");
                self.job_error = Some(e.user_message("creating job"));
                self.job_dialog = Some(draft);
                Err(e)
            }
        }
    }

    /// Rows for the jobs table, resolved against the current rule and
    /// agent snapshots.
    pub async fn job_rows(&self) -> Vec<JobRow> {
        let (jobs, rules, agents) = futures::join!(
            self.stores.jobs.snapshot(),
            self.stores.rules.snapshot(),
            self.stores.agents.snapshot(),
        );
        jobs.iter()
            .map(|job| JobRow::resolve(job, &rules, &agents))
            .collect()
    }

    /// Tear down the poller regardless of the active view.
    pub fn shutdown(&mut self) {
        self.poller.deactivate();
    }
}
