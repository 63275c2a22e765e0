//! Forward migration: every episode gets a quiz, orphans are archived and the
//! quiz link is tightened to `NOT NULL` + `ON DELETE CASCADE`.

use db::models::{episode::Model as EpisodeModel, quiz::Model as QuizModel};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::archive::{self, ArchiveReason};
use crate::audit::{self, AuditReport, EpisodeRef, OrphanedQuiz};
use crate::error::{RefactorError, RefactorResult, RunFailure};
use crate::payload::RollbackPayload;
use crate::run_log::{LogEntry, RunLog};
use crate::schema::{self, ForeignKeyShape, SchemaChange};
use crate::snapshot;
use crate::validate::{self, CheckStatus, ValidationReport};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MigrationOptions {
    pub dry_run: bool,
    pub force_execute: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    pub episodes_processed: u64,
    pub quizzes_created: u64,
    pub quizzes_archived: u64,
    pub archived_with_completions: u64,
    pub constraints_updated: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub success: bool,
    pub dry_run: bool,
    pub logs: Vec<LogEntry>,
    pub summary: MigrationSummary,
    pub rollback_data: RollbackPayload,
    pub validation: ValidationReport,
    pub post_audit: AuditReport,
}

struct Forward {
    summary: MigrationSummary,
    created: Vec<i64>,
    archived: Vec<i64>,
    post_audit: AuditReport,
}

/// Validates, snapshots and migrates inside one transaction.
///
/// A dry run executes every step and then rolls the transaction back.
pub async fn run(
    db: &DatabaseConnection,
    options: MigrationOptions,
) -> Result<MigrationReport, RunFailure> {
    let mut log = RunLog::new("migration");
    log.info(if options.dry_run {
        "Starting podcast-quiz migration (dry run)"
    } else {
        "Starting podcast-quiz migration"
    });

    let validation = match validate::validate(db).await {
        Ok(v) => v,
        Err(e) => return Err(log.fail(e.into())),
    };
    record_validation(&mut log, &validation);

    if !validation.passed {
        let issues = validation.failing().count();
        if options.force_execute {
            log.warning(format!(
                "Continuing despite {issues} validation issue(s) because forceExecute is set"
            ));
        } else {
            return Err(log.fail(RefactorError::ValidationBlocked(format!(
                "{issues} check(s) did not pass; rerun with forceExecute to override"
            ))));
        }
    }

    let snapshot = snapshot::capture(db, &mut log).await;

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(e) => return Err(log.fail(e.into())),
    };

    let forward = match migrate_in(&txn, &mut log).await {
        Ok(forward) => forward,
        Err(e) => {
            match txn.rollback().await {
                Ok(()) => log.info("Rolled back every change made by this run"),
                Err(rb) => log.error(format!("Failed to roll back the migration: {rb}")),
            }
            return Err(log.fail(e));
        }
    };

    let finished = if options.dry_run {
        txn.rollback().await
    } else {
        txn.commit().await
    };
    if let Err(e) = finished {
        return Err(log.fail(e.into()));
    }

    if options.dry_run {
        log.success("Dry run complete; no changes were kept");
    } else {
        log.success("Migration committed");
    }

    Ok(MigrationReport {
        success: true,
        dry_run: options.dry_run,
        logs: log.into_entries(),
        summary: forward.summary,
        rollback_data: RollbackPayload {
            created_quizzes: forward.created,
            archived_quizzes: forward.archived,
            original_constraints: snapshot.original_constraints,
        },
        validation,
        post_audit: forward.post_audit,
    })
}

fn record_validation(log: &mut RunLog, validation: &ValidationReport) {
    for check in &validation.checks {
        let data = json!({ "check": check.name, "data": check.data });
        match check.status {
            CheckStatus::Pass => log.info_with(check.message.clone(), data),
            CheckStatus::Warning | CheckStatus::Fail => {
                log.warning_with(check.message.clone(), data)
            }
        }
    }
}

async fn migrate_in<C: ConnectionTrait>(db: &C, log: &mut RunLog) -> RefactorResult<Forward> {
    let before = audit::audit(db).await?;
    log.info_with("Pre-migration audit", json!(before.summary()));

    let mut summary = MigrationSummary::default();

    let created = create_placeholders(db, &before.episodes_without_quizzes, log).await?;
    summary.episodes_processed = created.len() as u64;
    summary.quizzes_created = created.len() as u64;

    let (archived, with_completions) = archive_orphans(db, &before.orphaned_quizzes, log).await?;
    summary.quizzes_archived = archived.len() as u64;
    summary.archived_with_completions = with_completions;

    summary.constraints_updated = tighten(db, log).await?;

    let post_audit = audit::audit(db).await?;
    if !post_audit.episodes_without_quizzes.is_empty() {
        return Err(RefactorError::PostCheck(format!(
            "{} episode(s) still have no quiz",
            post_audit.episodes_without_quizzes.len()
        )));
    }
    log.success_with("Post-migration audit passed", json!(post_audit.summary()));

    Ok(Forward {
        summary,
        created,
        archived,
        post_audit,
    })
}

/// Step 1: one inactive placeholder quiz per episode without a quiz.
async fn create_placeholders<C: ConnectionTrait>(
    db: &C,
    episodes: &[EpisodeRef],
    log: &mut RunLog,
) -> RefactorResult<Vec<i64>> {
    if episodes.is_empty() {
        log.info("Every episode already has a quiz");
        return Ok(Vec::new());
    }

    log.info(format!("Creating placeholder quizzes for {} episode(s)", episodes.len()));

    let mut created = Vec::with_capacity(episodes.len());
    for episode in episodes {
        let title = format!("Quiz: {}", episode.title);
        let description = format!(
            "Placeholder quiz for episode #{} \"{}\". Add questions before activating it.",
            episode.id, episode.title
        );

        let quiz = QuizModel::create(db, &title, Some(&description), false).await?;
        EpisodeModel::set_quiz(db, episode.id, Some(quiz.id)).await?;

        log.info_with(
            format!("Linked episode #{} to placeholder quiz #{}", episode.id, quiz.id),
            json!({ "episodeId": episode.id, "quizId": quiz.id }),
        );
        created.push(quiz.id);
    }

    Ok(created)
}

/// Step 2: archive every orphaned quiz, used or not. Returns the archived ids
/// and how many of them had completions.
async fn archive_orphans<C: ConnectionTrait>(
    db: &C,
    orphans: &[OrphanedQuiz],
    log: &mut RunLog,
) -> RefactorResult<(Vec<i64>, u64)> {
    if orphans.is_empty() {
        log.info("No orphaned quizzes to archive");
        return Ok((Vec::new(), 0));
    }

    let mut archived = Vec::with_capacity(orphans.len());
    let mut with_completions = 0;

    for orphan in orphans {
        let Some(quiz) = QuizModel::get_by_id(db, orphan.id).await? else {
            log.warning(format!("Orphaned quiz #{} disappeared before archiving", orphan.id));
            continue;
        };

        archive::archive_quiz(db, &quiz, ArchiveReason::Orphaned, orphan.completion_count).await?;
        archived.push(quiz.id);

        let data = json!({ "quizId": quiz.id, "completionCount": orphan.completion_count });
        if orphan.completion_count > 0 {
            with_completions += 1;
            log.warning_with(
                format!(
                    "Archived orphaned quiz #{} with {} completion(s)",
                    quiz.id, orphan.completion_count
                ),
                data,
            );
        } else {
            log.info_with(format!("Archived orphaned quiz #{}", quiz.id), data);
        }
    }

    Ok((archived, with_completions))
}

/// Step 3: `NOT NULL` + `ON DELETE CASCADE`, checked before any DDL.
async fn tighten<C: ConnectionTrait>(db: &C, log: &mut RunLog) -> RefactorResult<u64> {
    let check = audit::audit(db).await?;
    let null_links = check.episodes_without_quizzes.len();
    let broken_links = check.broken_links.len();
    if null_links > 0 || broken_links > 0 {
        return Err(RefactorError::ConstraintCheck {
            null_links,
            broken_links,
        });
    }

    let state = schema::inspect(db).await?;
    if state.is_enforced() {
        log.info("Quiz link is already NOT NULL with ON DELETE CASCADE; skipping");
        return Ok(0);
    }

    let tightened = schema::apply_changes(
        db,
        &[
            SchemaChange::DropQuizForeignKey,
            SchemaChange::SetQuizIdNotNull,
            SchemaChange::AddQuizForeignKey(ForeignKeyShape::cascading()),
        ],
    )
    .await
    .map_err(|e| RefactorError::Schema(e.to_string()))?;

    if !tightened.is_enforced() {
        return Err(RefactorError::Schema(
            "quiz link is still not enforced after tightening".into(),
        ));
    }

    log.success_with(
        "Quiz link is now NOT NULL with ON DELETE CASCADE",
        json!(tightened),
    );
    Ok(1)
}
