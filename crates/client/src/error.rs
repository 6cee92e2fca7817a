use eval_planner_core::error::CoreError;

use crate::api::ApiError;

/// Error type for client-side actions.
///
/// Local validation failures ([`CoreError`]) and backend failures
/// ([`ApiError`]) keep distinct variants, but both are surfaced to the user
/// through the same [`ClientError::user_message`] format.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A domain-level error from `eval_planner_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The action needs an open form or dialog and there is none.
    #[error("Nothing to submit: no open {0}")]
    NothingToSubmit(&'static str),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Generic message shown for a failed action, e.g.
    /// `"Error saving rule: Validation failed: Rule name must not be empty"`.
    pub fn user_message(&self, action: &str) -> String {
        format!("Error {action}: {self}")
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Core(CoreError::Validation(_)))
    }
}
