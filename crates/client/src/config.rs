use std::time::Duration;

/// Default backend origin.
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default JobPoller period in milliseconds.
pub const DEFAULT_JOB_POLL_INTERVAL_MS: u64 = 3000;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash.
    pub api_base_url: String,
    /// Period between job list refreshes while the Jobs view is active.
    pub job_poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            job_poll_interval: Duration::from_millis(DEFAULT_JOB_POLL_INTERVAL_MS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `API_BASE_URL`         | `http://localhost:8000` |
    /// | `JOB_POLL_INTERVAL_MS` | `3000`                  |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. Missing or
    /// unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_base_url = lookup("API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_base_url);

        let job_poll_interval = match lookup("JOB_POLL_INTERVAL_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "JOB_POLL_INTERVAL_MS must be a positive integer, using default"
                    );
                    defaults.job_poll_interval
                }
            },
            None => defaults.job_poll_interval,
        };

        Self {
            api_base_url,
            job_poll_interval,
        }
    }
}
