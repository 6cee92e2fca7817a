//! Backend HTTP contract.
//!
//! [`EvalApi`] is the seam every store and controller talks to.
//! [`HttpEvalApi`] implements it over the REST endpoints using [`reqwest`].

use async_trait::async_trait;
use eval_planner_core::agent::{Agent, NewAgent};
use eval_planner_core::job::{Job, NewJob};
use eval_planner_core::rule::{Rule, RuleDraft};

pub const RULES_PATH: &str = "/api/rules";
pub const AGENTS_PATH: &str = "/api/agents";
pub const JOBS_PATH: &str = "/api/jobs";

/// Errors from the backend API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("{message} (HTTP {status})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Best available message extracted from the response body.
        message: String,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the backend exposes. Agents and jobs are create-only.
#[async_trait]
pub trait EvalApi: Send + Sync {
    async fn list_rules(&self) -> ApiResult<Vec<Rule>>;
    async fn create_rule(&self, draft: &RuleDraft) -> ApiResult<Rule>;
    async fn update_rule(&self, id: &str, draft: &RuleDraft) -> ApiResult<Rule>;
    async fn delete_rule(&self, id: &str) -> ApiResult<()>;

    async fn list_agents(&self) -> ApiResult<Vec<Agent>>;
    async fn create_agent(&self, agent: &NewAgent) -> ApiResult<Agent>;

    async fn list_jobs(&self) -> ApiResult<Vec<Job>>;
    async fn create_job(&self, job: &NewJob) -> ApiResult<Job>;
}

/// HTTP client for the eval planner backend.
pub struct HttpEvalApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEvalApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Backend origin, e.g. `http://localhost:8000`. A
    ///   trailing slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`] carrying
    /// the best available message on failure.
    async fn ensure_success(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: best_message(status, &body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> ApiResult<()> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl EvalApi for HttpEvalApi {
    async fn list_rules(&self) -> ApiResult<Vec<Rule>> {
        let response = self.client.get(self.url(RULES_PATH)).send().await?;
        Self::parse_response(response).await
    }

    async fn create_rule(&self, draft: &RuleDraft) -> ApiResult<Rule> {
        let response = self
            .client
            .post(self.url(RULES_PATH))
            .json(&draft.payload())
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_rule(&self, id: &str, draft: &RuleDraft) -> ApiResult<Rule> {
        let response = self
            .client
            .put(self.url(&format!("{RULES_PATH}/{id}")))
            .json(&draft.payload())
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete_rule(&self, id: &str) -> ApiResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("{RULES_PATH}/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn list_agents(&self) -> ApiResult<Vec<Agent>> {
        let response = self.client.get(self.url(AGENTS_PATH)).send().await?;
        Self::parse_response(response).await
    }

    async fn create_agent(&self, agent: &NewAgent) -> ApiResult<Agent> {
        let response = self
            .client
            .post(self.url(AGENTS_PATH))
            .json(agent)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn list_jobs(&self) -> ApiResult<Vec<Job>> {
        let response = self.client.get(self.url(JOBS_PATH)).send().await?;
        Self::parse_response(response).await
    }

    async fn create_job(&self, job: &NewJob) -> ApiResult<Job> {
        let response = self
            .client
            .post(self.url(JOBS_PATH))
            .json(job)
            .send()
            .await?;
        Self::parse_response(response).await
    }
}

/// Pick the most useful message out of an error response body.
///
/// Looks for a `detail`, `error` or `message` field in a JSON body, then
/// falls back to the raw text, then to the status reason phrase.
pub fn best_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            match json.get(key) {
                Some(serde_json::Value::String(text)) if !text.is_empty() => return text.clone(),
                Some(serde_json::Value::String(_)) | Some(serde_json::Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
