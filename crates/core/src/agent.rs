//! Registered agents (systems under test) and the registration draft.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{utc_timestamp, EntityId, Timestamp};

/// Initial `auth_config` text of the registration form.
pub const DEFAULT_AUTH_CONFIG_TEXT: &str = r#"{
  "headers": {
    "Authorization": "Bearer <token>"
  }
}"#;

/// A registered agent as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: EntityId,
    pub name: String,
    pub url: String,
    /// Opaque to the client beyond being valid JSON.
    #[serde(default)]
    pub auth_config: serde_json::Value,
    #[serde(with = "utc_timestamp")]
    pub created_at: Timestamp,
}

/// Registration form fields. `auth_config_text` is raw editor text and is
/// only parsed when the draft is turned into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDraft {
    pub name: String,
    pub url: String,
    pub auth_config_text: String,
}

/// Request body for `POST /api/agents`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAgent {
    pub name: String,
    pub url: String,
    pub auth_config: serde_json::Value,
}

impl Default for AgentDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            auth_config_text: DEFAULT_AUTH_CONFIG_TEXT.to_string(),
        }
    }
}

impl AgentDraft {
    /// Validate the draft and build the request body.
    ///
    /// Fails without side effects when `name` or `url` is empty or when
    /// `auth_config_text` is not valid JSON.
    pub fn to_request(&self) -> Result<NewAgent, CoreError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation(
                "Agent name must not be empty".to_string(),
            ));
        }
        let url = self.url.trim();
        if url.is_empty() {
            return Err(CoreError::Validation(
                "Agent URL must not be empty".to_string(),
            ));
        }
        let auth_config = parse_auth_config(&self.auth_config_text)?;

        Ok(NewAgent {
            name: name.to_string(),
            url: url.to_string(),
            auth_config,
        })
    }
}

/// Parse `auth_config` editor text into JSON.
pub fn parse_auth_config(text: &str) -> Result<serde_json::Value, CoreError> {
    serde_json::from_str(text)
        .map_err(|e| CoreError::Validation(format!("auth_config is not valid JSON: {e}")))
}
