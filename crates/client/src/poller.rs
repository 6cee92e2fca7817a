//! View-scoped job status polling.
//!
//! [`JobPoller`] refreshes the job store once on activation and then on a
//! fixed period until it is deactivated. Each activation spawns one task
//! owned through a [`CancellationToken`]; deactivation (explicit or on
//! drop) cancels it, and a refresh that is still in flight at that moment
//! is dropped before its response can be applied.

use std::sync::Arc;
use std::time::Duration;

use eval_planner_core::job::Job;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_JOB_POLL_INTERVAL_MS;
use crate::store::ResourceStore;

/// Default period between job refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(DEFAULT_JOB_POLL_INTERVAL_MS);

/// Handle to the task of one activation.
struct ActivePoll {
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl ActivePoll {
    fn stop(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Recurring refresh of the job store, bound to the Jobs view.
pub struct JobPoller {
    jobs: Arc<ResourceStore<Job>>,
    period: Duration,
    active: Option<ActivePoll>,
}

impl JobPoller {
    /// Create an idle poller. A zero `period` falls back to
    /// [`DEFAULT_POLL_INTERVAL`].
    pub fn new(jobs: Arc<ResourceStore<Job>>, period: Duration) -> Self {
        let period = if period.is_zero() {
            tracing::warn!("Job poll period must be non-zero, using default");
            DEFAULT_POLL_INTERVAL
        } else {
            period
        };
        Self {
            jobs,
            period,
            active: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Start polling: one immediate refresh, then one per period.
    ///
    /// If already active, the running schedule is torn down first so the
    /// new one starts from zero. Must be called inside a tokio runtime.
    pub fn activate(&mut self) {
        self.deactivate();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(Arc::clone(&self.jobs), self.period, cancel.clone()));
        self.active = Some(ActivePoll { cancel, task });

        tracing::info!(period_ms = self.period.as_millis() as u64, "Job poller activated");
    }

    /// Stop polling. Returns `false` if the poller was not active.
    pub fn deactivate(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.stop();
                tracing::info!("Job poller deactivated");
                true
            }
            None => false,
        }
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Poll loop for one activation. Runs until `cancel` is triggered.
async fn run(jobs: Arc<ResourceStore<Job>>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = jobs.refresh() => {
                tracing::trace!(?outcome, "Job poll tick");
            }
        }
    }

    tracing::debug!("Job poll loop stopped");
}
