//! Advisory pre-migration checks.
//!
//! Validation never blocks on its own. It reports `passed = false` when any
//! check is not a clean pass, and the migration decides whether to stop based
//! on `forceExecute`.

use chrono::{Duration, Utc};
use db::models::quiz_completion::Model as CompletionModel;
use sea_orm::{ConnectionTrait, DbErr};
use serde::Serialize;
use serde_json::{Value, json};

use crate::audit::{self, AuditReport};
use crate::schema::{self, QuizLinkState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationCheck {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ValidationCheck {
    fn new(name: &'static str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name,
            status,
            message: message.into(),
            data: None,
        }
    }

    fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    pub fn failing(&self) -> impl Iterator<Item = &ValidationCheck> {
        self.checks.iter().filter(|c| c.status != CheckStatus::Pass)
    }
}

pub async fn validate<C: ConnectionTrait>(db: &C) -> Result<ValidationReport, DbErr> {
    let report = audit::audit(db).await?;
    let recent = CompletionModel::count_since(db, Utc::now() - Duration::hours(24)).await?;
    let link = schema::inspect(db).await;

    let checks = vec![
        orphan_completions(&report),
        recent_activity(recent),
        shared_quizzes(&report),
        broken_links(&report),
        constraint_shape(link),
    ];

    Ok(ValidationReport {
        passed: checks.iter().all(|c| c.status == CheckStatus::Pass),
        checks,
    })
}

fn orphan_completions(report: &AuditReport) -> ValidationCheck {
    let affected: Vec<Value> = report
        .orphaned_quizzes
        .iter()
        .filter(|q| q.completion_count > 0)
        .map(|q| json!({ "quizId": q.id, "title": q.title, "completionCount": q.completion_count }))
        .collect();

    if affected.is_empty() {
        return ValidationCheck::new(
            "orphan_completions",
            CheckStatus::Pass,
            "No orphaned quiz has recorded completions",
        );
    }

    ValidationCheck::new(
        "orphan_completions",
        CheckStatus::Warning,
        format!(
            "{} orphaned quiz(zes) with {} completion(s) will be archived",
            affected.len(),
            report.orphan_completions()
        ),
    )
    .with_data(Value::Array(affected))
}

fn recent_activity(recent: u64) -> ValidationCheck {
    if recent == 0 {
        ValidationCheck::new(
            "recent_activity",
            CheckStatus::Pass,
            "No quiz completions in the last 24 hours",
        )
    } else {
        ValidationCheck::new(
            "recent_activity",
            CheckStatus::Warning,
            format!("{recent} quiz completion(s) in the last 24 hours; listeners are active"),
        )
        .with_data(json!({ "completionsLast24h": recent }))
    }
}

fn shared_quizzes(report: &AuditReport) -> ValidationCheck {
    if report.shared_quizzes.is_empty() {
        return ValidationCheck::new(
            "shared_quizzes",
            CheckStatus::Pass,
            "Every quiz is used by at most one episode",
        );
    }

    ValidationCheck::new(
        "shared_quizzes",
        CheckStatus::Warning,
        format!(
            "{} quiz(zes) are shared by several episodes and will not be split",
            report.shared_quizzes.len()
        ),
    )
    .with_data(json!(report.shared_quizzes))
}

fn broken_links(report: &AuditReport) -> ValidationCheck {
    if report.broken_links.is_empty() {
        return ValidationCheck::new(
            "broken_links",
            CheckStatus::Pass,
            "Every linked quiz exists",
        );
    }

    ValidationCheck::new(
        "broken_links",
        CheckStatus::Fail,
        format!(
            "{} episode(s) point at missing quizzes; the quiz link cannot be enforced",
            report.broken_links.len()
        ),
    )
    .with_data(json!(report.broken_links))
}

fn constraint_shape(link: Result<QuizLinkState, DbErr>) -> ValidationCheck {
    match link {
        Ok(state) if state.is_enforced() => ValidationCheck::new(
            "constraint_shape",
            CheckStatus::Pass,
            "Quiz link is already NOT NULL with ON DELETE CASCADE; tightening will be skipped",
        )
        .with_data(json!(state)),
        Ok(state) => ValidationCheck::new(
            "constraint_shape",
            CheckStatus::Pass,
            format!(
                "Quiz link is {} with {} foreign key(s); it will be tightened",
                if state.nullable { "nullable" } else { "NOT NULL" },
                state.constraints.len()
            ),
        )
        .with_data(json!(state)),
        Err(e) => ValidationCheck::new(
            "constraint_shape",
            CheckStatus::Warning,
            format!("Could not read the quiz link constraints: {e}"),
        ),
    }
}
