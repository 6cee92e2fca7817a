//! Evaluation jobs, the job-creation draft, and job list rows.

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::error::CoreError;
use crate::rule::Rule;
use crate::types::{short_id, utc_timestamp, EntityId, Timestamp, NOT_AVAILABLE};

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Server-owned job status.
///
/// The set of values is not closed: anything the client does not know is
/// preserved in [`JobStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(raw) => raw,
        }
    }

    /// Only COMPLETED gets distinct styling.
    pub fn is_completed(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PENDING" => JobStatus::Pending,
            "RUNNING" => JobStatus::Running,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Other(raw),
        }
    }
}

impl From<JobStatus> for String {
    fn from(value: JobStatus) -> Self {
        match value {
            JobStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A job as returned by the backend. `rule_id` and `agent_id` are plain
/// values; the referenced entities may no longer exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: EntityId,
    pub status: JobStatus,
    #[serde(default)]
    pub rule_id: Option<EntityId>,
    #[serde(default)]
    pub agent_id: Option<EntityId>,
    #[serde(with = "utc_timestamp")]
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// JobDraft
// ---------------------------------------------------------------------------

/// The `(rule_id, agent_id)` pair collected by the job-creation dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDraft {
    pub rule_id: Option<EntityId>,
    pub agent_id: Option<EntityId>,
}

/// Request body for `POST /api/jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewJob {
    pub rule_id: EntityId,
    pub agent_id: EntityId,
}

impl JobDraft {
    /// Draft opened from a rule's detail view.
    pub fn for_rule(rule_id: impl Into<EntityId>) -> Self {
        Self {
            rule_id: Some(rule_id.into()),
            agent_id: None,
        }
    }

    /// Draft opened from an agent's row.
    pub fn for_agent(agent_id: impl Into<EntityId>) -> Self {
        Self {
            rule_id: None,
            agent_id: Some(agent_id.into()),
        }
    }

    /// Select a rule. An empty id clears the field.
    pub fn set_rule(&mut self, rule_id: impl Into<EntityId>) {
        self.rule_id = Some(rule_id.into()).filter(|id: &EntityId| !id.is_empty());
    }

    /// Select an agent. An empty id clears the field.
    pub fn set_agent(&mut self, agent_id: impl Into<EntityId>) {
        self.agent_id = Some(agent_id.into()).filter(|id: &EntityId| !id.is_empty());
    }

    /// Whether the submit control should be enabled.
    pub fn is_complete(&self) -> bool {
        non_empty(&self.rule_id).is_some() && non_empty(&self.agent_id).is_some()
    }

    /// Build the request body, failing while either side is missing.
    pub fn to_request(&self) -> Result<NewJob, CoreError> {
        match (non_empty(&self.rule_id), non_empty(&self.agent_id)) {
            (Some(rule_id), Some(agent_id)) => Ok(NewJob {
                rule_id: rule_id.to_string(),
                agent_id: agent_id.to_string(),
            }),
            (None, _) => Err(CoreError::Validation("Select a rule".to_string())),
            (_, None) => Err(CoreError::Validation("Select an agent".to_string())),
        }
    }
}

fn non_empty(value: &Option<EntityId>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// JobRow
// ---------------------------------------------------------------------------

/// Display row for the jobs table with references resolved to names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRow {
    pub id: EntityId,
    pub short_id: String,
    pub rule_name: String,
    pub agent_name: String,
    pub status: String,
    pub completed: bool,
    pub created_at: String,
}

impl JobRow {
    /// Resolve a job's references against the current rule and agent
    /// snapshots. Unresolvable or missing references render as `N/A`.
    pub fn resolve(job: &Job, rules: &[Rule], agents: &[Agent]) -> Self {
        let rule_name = job
            .rule_id
            .as_deref()
            .and_then(|id| rules.iter().find(|r| r.id == id))
            .map(|r| r.name.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let agent_name = job
            .agent_id
            .as_deref()
            .and_then(|id| agents.iter().find(|a| a.id == id))
            .map(|a| a.name.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Self {
            id: job.id.clone(),
            short_id: short_id(&job.id).to_string(),
            rule_name,
            agent_name,
            status: job.status.to_string(),
            completed: job.status.is_completed(),
            created_at: job.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
