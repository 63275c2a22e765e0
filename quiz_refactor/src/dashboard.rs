//! Read-only status summary for operators.

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DbErr};
use serde::Serialize;

use crate::audit::{self, AuditReport, AuditSummary};
use crate::schema::{self, QuizLinkState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemStatus {
    /// Link enforced and no relationship gaps.
    Healthy,
    /// Link not enforced yet.
    ReadyForMigration,
    /// Link enforced but the audit still finds issues.
    PostMigrationState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recommendations {
    pub actions: Vec<String>,
    pub warnings: Vec<String>,
    pub blockers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub system_status: SystemStatus,
    pub next_action: String,
    pub summary: AuditSummary,
    pub quiz_link: QuizLinkState,
    pub recommendations: Recommendations,
    pub details: AuditReport,
}

pub async fn build<C: ConnectionTrait>(db: &C) -> Result<Dashboard, DbErr> {
    let report = audit::audit(db).await?;
    let link = schema::inspect(db).await?;
    Ok(derive(report, link))
}

/// Pure derivation of the dashboard from an audit and the live link shape.
pub fn derive(report: AuditReport, link: QuizLinkState) -> Dashboard {
    let system_status = status(&report, &link);
    let recommendations = recommend(&report, system_status);
    let next_action = next_action(system_status, &recommendations);

    Dashboard {
        generated_at: Utc::now(),
        system_status,
        next_action,
        summary: report.summary(),
        quiz_link: link,
        recommendations,
        details: report,
    }
}

fn status(report: &AuditReport, link: &QuizLinkState) -> SystemStatus {
    match (link.is_enforced(), report.is_clean()) {
        (false, _) => SystemStatus::ReadyForMigration,
        (true, true) => SystemStatus::Healthy,
        (true, false) => SystemStatus::PostMigrationState,
    }
}

fn recommend(report: &AuditReport, status: SystemStatus) -> Recommendations {
    let mut rec = Recommendations::default();

    if !report.broken_links.is_empty() {
        rec.blockers.push(format!(
            "{} episode(s) point at missing quizzes: {}",
            report.broken_links.len(),
            report
                .broken_links
                .iter()
                .map(|l| format!("#{} -> quiz #{}", l.episode_id, l.quiz_id))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    let orphan_completions = report.orphan_completions();
    if orphan_completions > 0 {
        rec.warnings.push(format!(
            "{orphan_completions} completion(s) belong to orphaned quizzes; they are archived, never deleted"
        ));
    }
    if !report.shared_quizzes.is_empty() {
        rec.warnings.push(format!(
            "{} quiz(zes) are shared by several episodes and need a manual split",
            report.shared_quizzes.len()
        ));
    }

    match status {
        SystemStatus::ReadyForMigration => {
            rec.actions
                .push("Run the migration as a dry run and review its logs".to_owned());
            if !report.episodes_without_quizzes.is_empty() {
                rec.actions.push(format!(
                    "Create placeholder quizzes for {} episode(s)",
                    report.episodes_without_quizzes.len()
                ));
            }
            if !report.orphaned_quizzes.is_empty() {
                rec.actions.push(format!(
                    "Archive {} orphaned quiz(zes)",
                    report.orphaned_quizzes.len()
                ));
            }
            rec.actions
                .push("Store the returned rollback data before running for real".to_owned());
        }
        SystemStatus::PostMigrationState => {
            if !report.orphaned_quizzes.is_empty() {
                rec.actions.push(format!(
                    "Re-run the migration to archive {} new orphaned quiz(zes)",
                    report.orphaned_quizzes.len()
                ));
            }
            if !report.episodes_without_quizzes.is_empty() {
                rec.actions.push(format!(
                    "Re-run the migration to link {} episode(s) without a quiz",
                    report.episodes_without_quizzes.len()
                ));
            }
        }
        SystemStatus::Healthy => {
            if report.archived_unlinked_quizzes > 0 {
                rec.actions.push(format!(
                    "Review {} archived quiz(zes) no episode uses",
                    report.archived_unlinked_quizzes
                ));
            }
        }
    }

    rec
}

fn next_action(status: SystemStatus, rec: &Recommendations) -> String {
    if let Some(blocker) = rec.blockers.first() {
        return format!("Resolve blockers first: {blocker}");
    }

    match status {
        SystemStatus::ReadyForMigration => {
            "Run a dry-run migration (POST /api/admin/podcast-quiz/migrate with dryRun: true)"
                .to_owned()
        }
        SystemStatus::PostMigrationState => {
            "Review the remaining issues and re-run the migration".to_owned()
        }
        SystemStatus::Healthy => "No action required".to_owned(),
    }
}
