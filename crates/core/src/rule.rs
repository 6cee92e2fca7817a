//! Evaluation rules: the entity, its editable draft, and draft validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::selection::Editable;
use crate::types::{utc_timestamp, EntityId, Timestamp};

/// Wire value of [`RuleType::Python`].
pub const RULE_TYPE_PYTHON: &str = "PYTHON";

/// Initial code of a brand-new PYTHON rule.
pub const DEFAULT_RULE_CODE: &str = r#"async def evaluate(agent_url, auth_config, config):
    import httpx
    async with httpx.AsyncClient() as client:
        res = await client.get(f"{agent_url}/health")
        return {"score": 1 if res.status_code == 200 else 0, "passed": res.status_code == 200}"#;

/// Maximum length of a rule name (backend column width).
const MAX_NAME_LEN: usize = 255;

// ---------------------------------------------------------------------------
// RuleType
// ---------------------------------------------------------------------------

/// Language of a rule's code. Only PYTHON exists today; unknown values are
/// kept verbatim so a newer backend does not break list refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleType {
    #[default]
    Python,
    Other(String),
}

impl RuleType {
    pub fn as_str(&self) -> &str {
        match self {
            RuleType::Python => RULE_TYPE_PYTHON,
            RuleType::Other(raw) => raw,
        }
    }
}

impl From<String> for RuleType {
    fn from(raw: String) -> Self {
        if raw == RULE_TYPE_PYTHON {
            RuleType::Python
        } else {
            RuleType::Other(raw)
        }
    }
}

impl From<RuleType> for String {
    fn from(value: RuleType) -> Self {
        match value {
            RuleType::Python => RULE_TYPE_PYTHON.to_string(),
            RuleType::Other(raw) => raw,
        }
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A rule as last returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub code_content: String,
    #[serde(default)]
    pub rule_type: RuleType,
    #[serde(with = "utc_timestamp")]
    pub created_at: Timestamp,
    #[serde(with = "utc_timestamp")]
    pub updated_at: Timestamp,
}

impl Rule {
    /// Date shown under the name in the rule list (`YYYY-MM-DD`).
    pub fn updated_on(&self) -> String {
        self.updated_at.format("%Y-%m-%d").to_string()
    }
}

// ---------------------------------------------------------------------------
// RuleDraft
// ---------------------------------------------------------------------------

/// Editable fields of a rule, detached from any stored [`Rule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDraft {
    pub name: String,
    pub description: String,
    pub code_content: String,
    pub rule_type: RuleType,
}

/// Request body for `POST /api/rules` and `PUT /api/rules/{id}`.
#[derive(Debug, Serialize)]
pub struct RulePayload<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub code_content: &'a str,
    pub rule_type: &'a str,
}

impl RuleDraft {
    /// Draft for a brand-new rule: empty metadata plus the default code.
    pub fn template() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            code_content: DEFAULT_RULE_CODE.to_string(),
            rule_type: RuleType::Python,
        }
    }

    /// Check the draft before any network call is made.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_rule_name(&self.name)
    }

    /// Wire body for create/update. The name is sent as typed; an empty
    /// description is sent as `null`.
    pub fn payload(&self) -> RulePayload<'_> {
        RulePayload {
            name: &self.name,
            description: Some(self.description.as_str()).filter(|d| !d.is_empty()),
            code_content: &self.code_content,
            rule_type: self.rule_type.as_str(),
        }
    }
}

impl From<&Rule> for RuleDraft {
    fn from(rule: &Rule) -> Self {
        Self {
            name: rule.name.clone(),
            description: rule.description.clone().unwrap_or_default(),
            code_content: rule.code_content.clone(),
            rule_type: rule.rule_type.clone(),
        }
    }
}

impl Editable for Rule {
    type Draft = RuleDraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_draft(&self) -> RuleDraft {
        RuleDraft::from(self)
    }

    fn template() -> RuleDraft {
        RuleDraft::template()
    }
}

/// Validate a rule name.
///
/// Rules:
/// - Must not be empty or whitespace only.
/// - Must not exceed `MAX_NAME_LEN` characters.
pub fn validate_rule_name(name: &str) -> Result<(), CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Rule name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Rule name must not exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}
