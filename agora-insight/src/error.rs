//! Error type for the analysis core.

use agora_common::ValidationError;
use thiserror::Error;

/// Result alias for the analysis core.
pub type InsightResult<T> = Result<T, InsightError>;

/// Everything that can stop a report from being produced.
///
/// Each variant carries enough context (opinion index, scenario name, field
/// path) for the failure to be reproduced independently.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The opinion set was empty.
    #[error("no opinions supplied; a report needs at least one opinion")]
    NoData,

    /// A scenario declared a value outside its valid range.
    #[error("scenario '{scenario}' failed validation: {source}")]
    Validation {
        scenario: String,
        #[source]
        source: ValidationError,
    },

    /// The configuration is structurally inconsistent.
    #[error("configuration error in {scope}: {reason}")]
    Configuration { scope: String, reason: String },

    /// The caller aborted the run.
    #[error("analysis aborted before opinion {index}")]
    Aborted { index: usize },
}

impl InsightError {
    pub(crate) fn configuration(scope: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            scope: scope.into(),
            reason: reason.into(),
        }
    }

    /// Name of the scenario involved, if the error is scenario-scoped.
    pub fn scenario(&self) -> Option<&str> {
        match self {
            Self::Validation { scenario, .. } => Some(scenario),
            Self::Configuration { scope, .. } => scope.strip_prefix("scenario '").and_then(|s| s.strip_suffix('\'')),
            _ => None,
        }
    }
}
