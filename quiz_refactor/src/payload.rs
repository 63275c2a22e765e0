//! The rollback payload handed back by every forward migration.
//!
//! The server never persists it. Callers store it and send it back verbatim
//! to reverse the migration.

use serde::{Deserialize, Serialize};

use crate::error::RefactorError;
use crate::schema::ConstraintDefinition;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackPayload {
    pub created_quizzes: Vec<i64>,
    pub archived_quizzes: Vec<i64>,
    pub original_constraints: Vec<ConstraintDefinition>,
}

/// A payload as received, before the required arrays are checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackPayloadInput {
    #[serde(default)]
    pub created_quizzes: Option<Vec<i64>>,
    #[serde(default)]
    pub archived_quizzes: Option<Vec<i64>>,
    #[serde(default)]
    pub original_constraints: Option<Vec<ConstraintDefinition>>,
}

impl RollbackPayloadInput {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.created_quizzes.is_none() {
            missing.push("createdQuizzes");
        }
        if self.archived_quizzes.is_none() {
            missing.push("archivedQuizzes");
        }
        if self.original_constraints.is_none() {
            missing.push("originalConstraints");
        }
        missing
    }

    /// Every array must be present unless `force` is set, in which case missing ones are empty.
    pub fn into_payload(self, force: bool) -> Result<RollbackPayload, RefactorError> {
        let missing = self.missing_fields();
        if !missing.is_empty() && !force {
            return Err(RefactorError::InvalidPayload(format!(
                "missing {}; set forceRollback to treat them as empty",
                missing.join(", ")
            )));
        }

        Ok(RollbackPayload {
            created_quizzes: self.created_quizzes.unwrap_or_default(),
            archived_quizzes: self.archived_quizzes.unwrap_or_default(),
            original_constraints: self.original_constraints.unwrap_or_default(),
        })
    }
}

impl From<RollbackPayload> for RollbackPayloadInput {
    fn from(payload: RollbackPayload) -> Self {
        Self {
            created_quizzes: Some(payload.created_quizzes),
            archived_quizzes: Some(payload.archived_quizzes),
            original_constraints: Some(payload.original_constraints),
        }
    }
}
