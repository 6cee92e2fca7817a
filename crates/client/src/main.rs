//! `eval-planner` -- console front-end for the eval planner backend.
//!
//! Loads rules, agents and jobs, switches to the Jobs view and logs the
//! job table every time the poller applies a new snapshot. Stops on
//! Ctrl-C.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 | Description              |
//! |------------------------|----------|-------------------------|--------------------------|
//! | `API_BASE_URL`         | no       | `http://localhost:8000` | Backend origin           |
//! | `JOB_POLL_INTERVAL_MS` | no       | `3000`                  | Job refresh period       |
//! | `RUST_LOG`             | no       | `eval_planner_client=info` | Log filter            |

use std::sync::Arc;

use eval_planner_client::api::{EvalApi, HttpEvalApi};
use eval_planner_client::config::ClientConfig;
use eval_planner_client::store::RefreshOutcome;
use eval_planner_client::tabs::{TabController, View};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eval_planner_client=info,eval_planner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        api_base_url = %config.api_base_url,
        poll_interval_ms = config.job_poll_interval.as_millis() as u64,
        "Starting eval-planner",
    );

    let api: Arc<dyn EvalApi> = Arc::new(HttpEvalApi::new(config.api_base_url.clone()));
    let mut tabs = TabController::new(api, config.job_poll_interval);

    let [rules, agents, jobs] = tabs.load_all().await;
    for (kind, outcome) in [("rules", rules), ("agents", agents), ("jobs", jobs)] {
        if outcome == RefreshOutcome::Failed {
            tracing::warn!(kind, "Initial load failed, starting with an empty list");
        }
    }

    let mut changes = tabs.stores().jobs.subscribe();
    tabs.switch_to(View::Jobs);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested");
                break;
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                render_jobs(&tabs).await;
            }
        }
    }

    tabs.shutdown();
}

/// Log the current job table, one line per job.
async fn render_jobs(tabs: &TabController) {
    let rows = tabs.job_rows().await;
    tracing::info!(count = rows.len(), "Jobs");
    for row in rows {
        tracing::info!(
            id = %row.short_id,
            rule = %row.rule_name,
            agent = %row.agent_name,
            status = %row.status,
            completed = row.completed,
            created_at = %row.created_at,
        );
    }
}
