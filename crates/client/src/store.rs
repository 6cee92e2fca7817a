//! Per-resource collection snapshots.
//!
//! A [`ResourceStore`] holds the last collection the backend returned for
//! one entity type. [`ResourceStore::refresh`] replaces the snapshot
//! wholesale; a failed refresh keeps the previous snapshot, and a response
//! that arrives after a newer one has already been applied is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use eval_planner_core::agent::Agent;
use eval_planner_core::job::Job;
use eval_planner_core::rule::Rule;
use tokio::sync::{watch, RwLock};

use crate::api::{ApiResult, EvalApi};

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// An entity type that has a list endpoint.
#[async_trait]
pub trait Resource: Clone + Send + Sync + 'static {
    /// Name used in log fields.
    const KIND: &'static str;

    fn entity_id(&self) -> &str;

    /// Fetch the full collection, in server order.
    async fn fetch_all(api: &dyn EvalApi) -> ApiResult<Vec<Self>>;
}

#[async_trait]
impl Resource for Rule {
    const KIND: &'static str = "rule";

    fn entity_id(&self) -> &str {
        &self.id
    }

    async fn fetch_all(api: &dyn EvalApi) -> ApiResult<Vec<Self>> {
        api.list_rules().await
    }
}

#[async_trait]
impl Resource for Agent {
    const KIND: &'static str = "agent";

    fn entity_id(&self) -> &str {
        &self.id
    }

    async fn fetch_all(api: &dyn EvalApi) -> ApiResult<Vec<Self>> {
        api.list_agents().await
    }
}

#[async_trait]
impl Resource for Job {
    const KIND: &'static str = "job";

    fn entity_id(&self) -> &str {
        &self.id
    }

    async fn fetch_all(api: &dyn EvalApi) -> ApiResult<Vec<Self>> {
        api.list_jobs().await
    }
}

// ---------------------------------------------------------------------------
// ResourceStore
// ---------------------------------------------------------------------------

/// Result of a single [`ResourceStore::refresh`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response replaced the snapshot.
    Applied { count: usize },
    /// A later refresh had already been applied; the response was dropped.
    Superseded,
    /// The fetch failed; the previous snapshot is untouched.
    Failed,
}

struct Snapshot<T> {
    items: Arc<Vec<T>>,
    /// Ticket of the refresh that produced `items` (0 = never refreshed).
    applied_ticket: u64,
}

/// Last-known collection of one resource type.
///
/// Shared via `Arc` between the interaction loop and background pollers.
pub struct ResourceStore<T> {
    api: Arc<dyn EvalApi>,
    state: RwLock<Snapshot<T>>,
    /// Last ticket handed out to a refresh.
    issued: AtomicU64,
    /// Bumped every time a snapshot is applied.
    version: watch::Sender<u64>,
}

impl<T: Resource> ResourceStore<T> {
    /// Create an empty store. Nothing is fetched until [`refresh`](Self::refresh).
    pub fn new(api: Arc<dyn EvalApi>) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            api,
            state: RwLock::new(Snapshot {
                items: Arc::new(Vec::new()),
                applied_ticket: 0,
            }),
            issued: AtomicU64::new(0),
            version,
        }
    }

    /// Fetch the full collection and replace the snapshot with it.
    ///
    /// Failures are logged and leave the snapshot as it was. A response is
    /// applied only if no refresh issued after it has been applied already.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let items = match T::fetch_all(self.api.as_ref()).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    kind = T::KIND,
                    ticket,
                    error = %e,
                    "Refresh failed, keeping previous snapshot",
                );
                return RefreshOutcome::Failed;
            }
        };

        let mut state = self.state.write().await;
        if ticket <= state.applied_ticket {
            tracing::debug!(
                kind = T::KIND,
                ticket,
                applied_ticket = state.applied_ticket,
                "Discarding superseded refresh response",
            );
            return RefreshOutcome::Superseded;
        }

        let count = items.len();
        state.items = Arc::new(items);
        state.applied_ticket = ticket;
        drop(state);

        self.version.send_modify(|v| *v += 1);
        tracing::debug!(kind = T::KIND, ticket, count, "Snapshot replaced");

        RefreshOutcome::Applied { count }
    }

    /// Current collection, in server order.
    pub async fn snapshot(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.state.read().await.items)
    }

    /// Look an entity up by its full id.
    pub async fn find(&self, id: &str) -> Option<T> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|item| item.entity_id() == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of snapshots applied so far.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Receiver that changes every time a new snapshot is applied.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// The three resource stores, cheaply cloneable.
#[derive(Clone)]
pub struct Stores {
    pub rules: Arc<ResourceStore<Rule>>,
    pub agents: Arc<ResourceStore<Agent>>,
    pub jobs: Arc<ResourceStore<Job>>,
}

impl Stores {
    pub fn new(api: Arc<dyn EvalApi>) -> Self {
        Self {
            rules: Arc::new(ResourceStore::new(Arc::clone(&api))),
            agents: Arc::new(ResourceStore::new(Arc::clone(&api))),
            jobs: Arc::new(ResourceStore::new(api)),
        }
    }

    /// Refresh all three collections concurrently.
    pub async fn refresh_all(&self) -> [RefreshOutcome; 3] {
        let (rules, agents, jobs) = futures::join!(
            self.rules.refresh(),
            self.agents.refresh(),
            self.jobs.refresh(),
        );
        [rules, agents, jobs]
    }
}
