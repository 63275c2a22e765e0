//! Reverses a forward migration from its [`RollbackPayload`].
//!
//! Constraints are loosened first so that nulling links and deleting
//! placeholders is never rejected by the tightened foreign key. Placeholders
//! that collected completions are archived instead of deleted.

use db::models::{
    episode::Model as EpisodeModel, quiz::Model as QuizModel,
    quiz_completion::Model as CompletionModel,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::archive::{self, ArchiveReason};
use crate::audit::{self, AuditReport};
use crate::error::{RefactorError, RefactorResult, RunFailure};
use crate::payload::{RollbackPayload, RollbackPayloadInput};
use crate::run_log::{LogEntry, RunLog};
use crate::schema::{self, ForeignKeyShape, SchemaChange};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackRequest {
    #[serde(default)]
    pub rollback_data: Option<RollbackPayloadInput>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub force_rollback: bool,
}

impl RollbackRequest {
    pub fn new(payload: RollbackPayload) -> Self {
        Self {
            rollback_data: Some(payload.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackSummary {
    pub constraints_restored: u64,
    pub quizzes_deleted: u64,
    pub quizzes_archived: u64,
    pub quizzes_unarchived: u64,
    pub episodes_affected: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackReport {
    pub success: bool,
    pub dry_run: bool,
    pub logs: Vec<LogEntry>,
    pub summary: RollbackSummary,
    /// Reported, not enforced: rollback restores episodes without a quiz.
    pub all_episodes_linked: bool,
    pub post_audit: AuditReport,
}

pub async fn run(
    db: &DatabaseConnection,
    request: RollbackRequest,
) -> Result<RollbackReport, RunFailure> {
    let mut log = RunLog::new("rollback");
    log.info(if request.dry_run {
        "Starting podcast-quiz rollback (dry run)"
    } else {
        "Starting podcast-quiz rollback"
    });

    let input = request.rollback_data.unwrap_or_default();
    let missing = input.missing_fields();
    let payload = match input.into_payload(request.force_rollback) {
        Ok(payload) => payload,
        Err(e) => return Err(log.fail(e)),
    };
    for field in missing {
        log.warning(format!("{field} missing from rollback data; treated as empty (forceRollback)"));
    }
    log.info_with(
        "Rollback data accepted",
        json!({
            "createdQuizzes": payload.created_quizzes.len(),
            "archivedQuizzes": payload.archived_quizzes.len(),
            "originalConstraints": payload.original_constraints.len(),
        }),
    );

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(e) => return Err(log.fail(e.into())),
    };

    let summary = match rollback_in(&txn, &payload, &mut log).await {
        Ok(summary) => summary,
        Err(e) => {
            match txn.rollback().await {
                Ok(()) => log.info("Rolled back every change made by this run"),
                Err(rb) => log.error(format!("Failed to roll back the rollback run: {rb}")),
            }
            return Err(log.fail(e));
        }
    };

    let post_audit = match audit::audit(&txn).await {
        Ok(report) => report,
        Err(e) => {
            if let Err(rb) = txn.rollback().await {
                log.error(format!("Failed to roll back the rollback run: {rb}"));
            }
            return Err(log.fail(e.into()));
        }
    };

    let all_episodes_linked = post_audit.episodes_without_quizzes.is_empty();
    if all_episodes_linked {
        log.info("Every episode still has a quiz");
    } else {
        log.info_with(
            format!(
                "{} episode(s) are back to having no quiz",
                post_audit.episodes_without_quizzes.len()
            ),
            json!(post_audit.summary()),
        );
    }

    let finished = if request.dry_run {
        txn.rollback().await
    } else {
        txn.commit().await
    };
    if let Err(e) = finished {
        return Err(log.fail(e.into()));
    }

    if request.dry_run {
        log.success("Dry run complete; no changes were kept");
    } else {
        log.success("Rollback committed");
    }

    Ok(RollbackReport {
        success: true,
        dry_run: request.dry_run,
        logs: log.into_entries(),
        summary,
        all_episodes_linked,
        post_audit,
    })
}

async fn rollback_in<C: ConnectionTrait>(
    db: &C,
    payload: &RollbackPayload,
    log: &mut RunLog,
) -> RefactorResult<RollbackSummary> {
    let mut summary = RollbackSummary::default();

    summary.constraints_restored += loosen_column(db, log).await?;
    summary.constraints_restored += restore_foreign_key(db, payload, log).await?;

    for &quiz_id in &payload.created_quizzes {
        remove_placeholder(db, quiz_id, &mut summary, log).await?;
    }

    for &quiz_id in &payload.archived_quizzes {
        let Some(quiz) = QuizModel::get_by_id(db, quiz_id).await? else {
            log.warning(format!("Archived quiz #{quiz_id} no longer exists; skipping"));
            continue;
        };

        if !archive::is_archived(&quiz) {
            log.info(format!("Quiz #{quiz_id} is not archived; leaving it as is"));
            continue;
        }

        archive::unarchive_quiz(db, &quiz).await?;
        summary.quizzes_unarchived += 1;
        log.info_with(format!("Restored archived quiz #{quiz_id}"), json!({ "quizId": quiz_id }));
    }

    Ok(summary)
}

/// Step 1: drop `NOT NULL` on `episodes.quiz_id`.
async fn loosen_column<C: ConnectionTrait>(db: &C, log: &mut RunLog) -> RefactorResult<u64> {
    let state = schema::inspect(db).await?;
    if state.nullable {
        log.info("episodes.quiz_id is already nullable");
        return Ok(0);
    }

    schema::apply_changes(db, &[SchemaChange::DropQuizIdNotNull])
        .await
        .map_err(|e| RefactorError::Schema(e.to_string()))?;
    log.success("Dropped NOT NULL on episodes.quiz_id");
    Ok(1)
}

/// Step 2: replace the tightened foreign key with the snapshot, as `ON DELETE SET NULL`.
async fn restore_foreign_key<C: ConnectionTrait>(
    db: &C,
    payload: &RollbackPayload,
    log: &mut RunLog,
) -> RefactorResult<u64> {
    let Some(original) = payload.original_constraints.first() else {
        log.warning("No original constraint in the rollback data; foreign key not recreated");
        let state = schema::inspect(db).await?;
        if !state.constraints.is_empty() {
            schema::apply_changes(db, &[SchemaChange::DropQuizForeignKey])
                .await
                .map_err(|e| RefactorError::Schema(e.to_string()))?;
            log.info("Dropped the tightened foreign key");
        }
        return Ok(0);
    };

    let restored = schema::apply_changes(
        db,
        &[
            SchemaChange::DropQuizForeignKey,
            SchemaChange::AddQuizForeignKey(ForeignKeyShape::restored_from(original)),
        ],
    )
    .await
    .map_err(|e| RefactorError::Schema(e.to_string()))?;

    log.success_with(
        "Restored the original foreign key with ON DELETE SET NULL",
        json!(restored.constraints),
    );
    Ok(1)
}

/// Step 3 for one created quiz: archive if used, otherwise unlink and delete.
async fn remove_placeholder<C: ConnectionTrait>(
    db: &C,
    quiz_id: i64,
    summary: &mut RollbackSummary,
    log: &mut RunLog,
) -> RefactorResult<()> {
    let Some(quiz) = QuizModel::get_by_id(db, quiz_id).await? else {
        log.warning(format!("Created quiz #{quiz_id} no longer exists; skipping"));
        return Ok(());
    };

    let completions = CompletionModel::count_for_quiz(db, quiz_id).await?;
    if completions > 0 {
        archive::archive_quiz(db, &quiz, ArchiveReason::UsedPlaceholder, completions).await?;
        let unlinked = EpisodeModel::clear_quiz_links(db, quiz_id).await?;
        summary.quizzes_archived += 1;
        summary.episodes_affected += unlinked;
        log.warning_with(
            format!("Archived placeholder quiz #{quiz_id} instead of deleting it: {completions} completion(s)"),
            json!({ "quizId": quiz_id, "completionCount": completions, "episodesUnlinked": unlinked }),
        );
    } else {
        let unlinked = EpisodeModel::clear_quiz_links(db, quiz_id).await?;
        QuizModel::delete(db, quiz_id).await?;
        summary.quizzes_deleted += 1;
        summary.episodes_affected += unlinked;
        log.info_with(
            format!("Deleted placeholder quiz #{quiz_id}"),
            json!({ "quizId": quiz_id, "episodesUnlinked": unlinked }),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ARCHIVED_PREFIX;
    use crate::migrate::{self, MigrationOptions};
    use crate::run_log::LogLevel;
    use crate::schema::ReferentialAction;
    use crate::test_support::{rows, seed_scenario};
    use db::test_utils::setup_test_db;

    async fn migrated(db: &DatabaseConnection) -> RollbackPayload {
        migrate::run(db, MigrationOptions::default())
            .await
            .unwrap()
            .rollback_data
    }

    #[tokio::test]
    async fn restores_the_reference_scenario() {
        let db = setup_test_db().await;
        let s = seed_scenario(&db).await;
        let payload = migrated(&db).await;

        let report = run(&db, RollbackRequest::new(payload.clone())).await.unwrap();

        assert_eq!(
            report.summary,
            RollbackSummary {
                constraints_restored: 2,
                quizzes_deleted: 2,
                quizzes_archived: 0,
                quizzes_unarchived: 1,
                episodes_affected: 2,
            }
        );
        assert!(!report.all_episodes_linked);

        for episode in [&s.e2, &s.e3] {
            let reloaded = EpisodeModel::get_by_id(&db, episode.id).await.unwrap().unwrap();
            assert_eq!(reloaded.quiz_id, None);
        }
        for id in &payload.created_quizzes {
            assert!(QuizModel::get_by_id(&db, *id).await.unwrap().is_none());
        }
        assert_eq!(QuizModel::count_all(&db).await.unwrap(), 2);

        let q2 = QuizModel::get_by_id(&db, s.q2.id).await.unwrap().unwrap();
        assert_eq!(q2.title, s.q2.title);
        assert_eq!(q2.description, s.q2.description);
        assert!(q2.is_active);

        let e1 = EpisodeModel::get_by_id(&db, s.e1.id).await.unwrap().unwrap();
        assert_eq!(e1.quiz_id, Some(s.q1.id));

        let state = schema::inspect(&db).await.unwrap();
        assert!(state.nullable);
        assert_eq!(state.constraints.len(), 1);
        assert_eq!(state.constraints[0].on_delete, ReferentialAction::SetNull);
    }

    #[tokio::test]
    async fn archived_orphans_come_back_unchanged() {
        let db = setup_test_db().await;
        let originals = [
            QuizModel::create(&db, "Blank notes", Some(""), true).await.unwrap(),
            QuizModel::create(&db, "Whitespace notes", Some("   "), true).await.unwrap(),
            QuizModel::create(&db, "Trailing newline", Some("Notes\n"), true).await.unwrap(),
            QuizModel::create(&db, "[ARCHIVED] Legacy quiz", None, true).await.unwrap(),
            QuizModel::create(&db, "Draft quiz", Some("WIP"), false).await.unwrap(),
        ];
        let payload = migrated(&db).await;
        assert_eq!(payload.archived_quizzes.len(), originals.len());

        let report = run(&db, RollbackRequest::new(payload)).await.unwrap();

        assert_eq!(report.summary.quizzes_unarchived, originals.len() as u64);
        for original in &originals {
            let quiz = QuizModel::get_by_id(&db, original.id).await.unwrap().unwrap();
            assert_eq!(quiz.title, original.title);
            assert_eq!(quiz.description, original.description);
            assert_eq!(quiz.is_active, original.is_active);
        }
    }

    #[tokio::test]
    async fn used_placeholder_is_archived_and_unlinked() {
        let db = setup_test_db().await;
        let s = seed_scenario(&db).await;
        let payload = migrated(&db).await;

        let e2 = EpisodeModel::get_by_id(&db, s.e2.id).await.unwrap().unwrap();
        let used = e2.quiz_id.unwrap();
        CompletionModel::create(&db, used, 42, 100).await.unwrap();

        let report = run(&db, RollbackRequest::new(payload)).await.unwrap();

        assert_eq!(report.summary.quizzes_archived, 1);
        assert_eq!(report.summary.quizzes_deleted, 1);

        let quiz = QuizModel::get_by_id(&db, used).await.unwrap().unwrap();
        assert!(quiz.title.starts_with(ARCHIVED_PREFIX));
        assert!(!quiz.is_active);
        assert_eq!(CompletionModel::count_for_quiz(&db, used).await.unwrap(), 1);

        let e2 = EpisodeModel::get_by_id(&db, s.e2.id).await.unwrap().unwrap();
        assert_eq!(e2.quiz_id, None);
    }

    #[tokio::test]
    async fn dry_run_changes_nothing() {
        let db = setup_test_db().await;
        seed_scenario(&db).await;
        let payload = migrated(&db).await;
        let rows_before = rows(&db).await;
        let audit_before = audit::audit(&db).await.unwrap();

        let report = run(
            &db,
            RollbackRequest {
                dry_run: true,
                ..RollbackRequest::new(payload)
            },
        )
        .await
        .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.summary.quizzes_deleted, 2);
        assert_eq!(rows(&db).await, rows_before);
        assert_eq!(audit::audit(&db).await.unwrap(), audit_before);
        assert!(schema::inspect(&db).await.unwrap().is_enforced());
    }

    #[tokio::test]
    async fn missing_arrays_are_rejected_unless_forced() {
        let db = setup_test_db().await;
        seed_scenario(&db).await;
        migrated(&db).await;
        let rows_before = rows(&db).await;

        let failure = run(&db, RollbackRequest::default()).await.unwrap_err();
        assert!(matches!(failure.error, RefactorError::InvalidPayload(_)));
        assert_eq!(rows(&db).await, rows_before);

        let forced = run(
            &db,
            RollbackRequest {
                force_rollback: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(forced.summary.quizzes_deleted, 0);
        assert_eq!(forced.summary.constraints_restored, 1);
        assert!(forced.logs.iter().filter(|l| l.level == LogLevel::Warning).count() >= 3);

        let state = schema::inspect(&db).await.unwrap();
        assert!(state.nullable);
        assert!(state.constraints.is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_are_skipped_with_warnings() {
        let db = setup_test_db().await;
        seed_scenario(&db).await;
        let mut payload = migrated(&db).await;
        payload.created_quizzes.push(7_001);
        payload.archived_quizzes.push(7_002);

        let report = run(&db, RollbackRequest::new(payload)).await.unwrap();

        assert_eq!(report.summary.quizzes_deleted, 2);
        let warnings: Vec<&str> = report
            .logs
            .iter()
            .filter(|l| l.level == LogLevel::Warning)
            .map(|l| l.message.as_str())
            .collect();
        assert!(warnings.iter().any(|m| m.contains("#7001")));
        assert!(warnings.iter().any(|m| m.contains("#7002")));
    }
}
