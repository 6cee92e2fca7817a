//! Rule selection and editing against the backend.
//!
//! [`SelectionController`] drives the pure [`Selection`] state machine and
//! performs the create/update/delete round-trips. Drafts are committed only
//! through [`SelectionController::save`]; the rule store is refreshed after
//! every successful mutation and is never patched locally.

use std::sync::Arc;

use eval_planner_core::error::CoreError;
use eval_planner_core::rule::{Rule, RuleDraft};
use eval_planner_core::selection::Selection;
use eval_planner_core::types::EntityId;

use crate::api::EvalApi;
use crate::error::{ClientError, ClientResult};
use crate::store::ResourceStore;

/// Owns the Idle/Viewing/Editing state of the rules view.
pub struct SelectionController {
    api: Arc<dyn EvalApi>,
    rules: Arc<ResourceStore<Rule>>,
    selection: Selection<Rule>,
    /// Rule awaiting delete confirmation.
    pending_delete: Option<EntityId>,
    /// Message of the last failed action, cleared by the next success.
    last_error: Option<String>,
}

impl SelectionController {
    pub fn new(api: Arc<dyn EvalApi>, rules: Arc<ResourceStore<Rule>>) -> Self {
        Self {
            api,
            rules,
            selection: Selection::Idle,
            pending_delete: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> &Selection<Rule> {
        &self.selection
    }

    pub fn draft(&self) -> Option<&RuleDraft> {
        self.selection.draft()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    // ---- transitions without I/O ----

    /// Any state -> Viewing(rule).
    pub fn select(&mut self, rule: Rule) {
        tracing::debug!(rule_id = %rule.id, "Rule selected");
        self.selection.select(rule);
        self.last_error = None;
    }

    /// Select a rule from the current store snapshot by its full id.
    pub async fn select_by_id(&mut self, id: &str) -> ClientResult<()> {
        let rule = self
            .rules
            .find(id)
            .await
            .ok_or_else(|| CoreError::NotFound {
                entity: "Rule",
                id: id.to_string(),
            })?;
        self.select(rule);
        Ok(())
    }

    /// Viewing -> Editing. Rejected from any other state.
    pub fn edit(&mut self) -> ClientResult<()> {
        self.selection.edit()?;
        Ok(())
    }

    /// Any state -> Editing with the default template.
    pub fn create_new(&mut self) {
        self.selection.create_new();
        self.last_error = None;
    }

    /// Apply an edit to the draft. Only possible while Editing.
    pub fn update_draft(&mut self, edit: impl FnOnce(&mut RuleDraft)) -> ClientResult<()> {
        self.selection.update_draft(edit)?;
        Ok(())
    }

    /// Abandon the current draft.
    pub fn cancel(&mut self) {
        self.close();
    }

    /// Any state -> Idle, discarding the draft.
    pub fn close(&mut self) {
        self.selection.close();
        self.last_error = None;
    }

    // ---- round-trips ----

    /// Commit the draft.
    ///
    /// Validates locally first, then creates or updates depending on
    /// whether the draft is backed by an existing rule. On success the rule
    /// store is refreshed and the state becomes Viewing(persisted rule). On
    /// failure the state and draft are left exactly as they were.
    pub async fn save(&mut self) -> ClientResult<Rule> {
        let (backing_id, draft) = match &self.selection {
            Selection::Editing { source, form } => (
                source.as_ref().map(|rule| rule.id.clone()),
                form.draft().clone(),
            ),
            other => {
                return Err(CoreError::InvalidTransition {
                    state: other.label(),
                    action: "save",
                }
                .into())
            }
        };

        match self.commit(backing_id.as_deref(), &draft).await {
            Ok(rule) => {
                self.rules.refresh().await;
                self.selection.select(rule.clone());
                self.last_error = None;
                Ok(rule)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Saving rule failed");
                self.last_error = Some(e.user_message("saving rule"));
                Err(e)
            }
        }
    }

    async fn commit(&self, backing_id: Option<&str>, draft: &RuleDraft) -> ClientResult<Rule> {
        draft.validate()?;
        let rule = match backing_id {
            Some(id) => {
                let rule = self.api.update_rule(id, draft).await?;
                tracing::info!(rule_id = %rule.id, "Rule updated");
                rule
            }
            None => {
                let rule = self.api.create_rule(draft).await?;
                tracing::info!(rule_id = %rule.id, name = %rule.name, "Rule created");
                rule
            }
        };
        Ok(rule)
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: impl Into<EntityId>) {
        self.pending_delete = Some(id.into());
    }

    /// Drop a pending delete without any network call.
    pub fn dismiss_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Perform the pending delete.
    pub async fn confirm_delete(&mut self) -> ClientResult<()> {
        let id = self
            .pending_delete
            .take()
            .ok_or(ClientError::NothingToSubmit("delete confirmation"))?;
        self.delete(&id).await
    }

    /// Delete a rule remotely and refresh the store.
    ///
    /// If the rule was selected (viewed or being edited) the state is
    /// forced to Idle, and a pending confirmation for it is dropped. On
    /// failure the store and state are unchanged.
    pub async fn delete(&mut self, id: &str) -> ClientResult<()> {
        if let Err(e) = self.api.delete_rule(id).await {
            let e = ClientError::from(e);
            tracing::warn!(rule_id = %id, error = %e, "Deleting rule failed");
            self.last_error = Some(e.user_message("deleting rule"));
            return Err(e);
        }
        tracing::info!(rule_id = %id, "Rule deleted");

        if self.pending_delete.as_deref() == Some(id) {
            self.pending_delete = None;
        }

        self.rules.refresh().await;
        if self.selection.selected_id() == Some(id) {
            self.selection.close();
        }
        self.last_error = None;
        Ok(())
    }
}
