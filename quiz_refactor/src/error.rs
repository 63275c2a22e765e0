use sea_orm::DbErr;
use serde::Serialize;

use crate::run_log::LogEntry;

pub type RefactorResult<T> = Result<T, RefactorError>;

/// Errors raised by audits, migrations and rollbacks.
#[derive(Debug, thiserror::Error)]
pub enum RefactorError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Validation blocked the run: {0}")]
    ValidationBlocked(String),

    #[error("Invalid rollback data: {0}")]
    InvalidPayload(String),

    #[error(
        "Cannot enforce the quiz link: {null_links} episode(s) without a quiz, {broken_links} pointing at missing quizzes"
    )]
    ConstraintCheck { null_links: usize, broken_links: usize },

    #[error("Post-migration check failed: {0}")]
    PostCheck(String),

    #[error("Schema change failed: {0}")]
    Schema(String),
}

impl RefactorError {
    /// Stable machine-readable kind, used in HTTP error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            RefactorError::Database(_) => "database",
            RefactorError::ValidationBlocked(_) => "validation_blocked",
            RefactorError::InvalidPayload(_) => "invalid_payload",
            RefactorError::ConstraintCheck { .. } => "constraint_check",
            RefactorError::PostCheck(_) => "post_check",
            RefactorError::Schema(_) => "schema",
        }
    }
}

/// A failed migration or rollback run, with every log line collected before the failure.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct RunFailure {
    pub error: RefactorError,
    pub logs: Vec<LogEntry>,
}

/// Serializable view of a [`RunFailure`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub success: bool,
    pub error_kind: &'static str,
    pub error: String,
    pub logs: Vec<LogEntry>,
}

impl From<&RunFailure> for FailureReport {
    fn from(failure: &RunFailure) -> Self {
        Self {
            success: false,
            error_kind: failure.error.kind(),
            error: failure.error.to_string(),
            logs: failure.logs.clone(),
        }
    }
}
