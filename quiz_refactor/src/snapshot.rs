//! Pre-mutation capture of the quiz link constraints.

use sea_orm::ConnectionTrait;
use serde_json::json;

use crate::run_log::RunLog;
use crate::schema::{self, ConstraintDefinition};

#[derive(Debug, Clone, Default)]
pub struct RollbackSnapshot {
    pub original_constraints: Vec<ConstraintDefinition>,
}

/// Records the current foreign key definitions.
///
/// Introspection failure does not stop a migration: a warning is logged and
/// the snapshot is empty, so a later rollback loosens the column but cannot
/// recreate the original foreign key.
pub async fn capture<C: ConnectionTrait>(db: &C, log: &mut RunLog) -> RollbackSnapshot {
    match schema::inspect(db).await {
        Ok(state) => {
            log.info_with(
                format!(
                    "Captured {} original constraint(s) for rollback",
                    state.constraints.len()
                ),
                json!({ "constraints": state.constraints, "nullable": state.nullable }),
            );
            RollbackSnapshot {
                original_constraints: state.constraints,
            }
        }
        Err(e) => {
            log.warning(format!(
                "Could not capture original constraints, rollback will not recreate them: {e}"
            ));
            RollbackSnapshot::default()
        }
    }
}
