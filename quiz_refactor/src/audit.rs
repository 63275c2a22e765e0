//! Read-only audit of the episode/quiz relationship.

use std::collections::{BTreeMap, HashSet};

use crate::archive;
use db::models::{
    episode::Model as EpisodeModel, quiz::Model as QuizModel,
    quiz_completion::Model as CompletionModel,
};
use sea_orm::{ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRef {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedQuiz {
    pub id: i64,
    pub title: String,
    pub completion_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedQuiz {
    pub quiz_id: i64,
    pub episode_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLink {
    pub episode_id: i64,
    pub title: String,
    pub quiz_id: i64,
}

/// Full audit of the relationship at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub total_episodes: u64,
    pub total_quizzes: u64,
    pub episodes_without_quizzes: Vec<EpisodeRef>,
    /// Quizzes that no episode references and that are not archived yet.
    pub orphaned_quizzes: Vec<OrphanedQuiz>,
    pub shared_quizzes: Vec<SharedQuiz>,
    pub broken_links: Vec<BrokenLink>,
    /// Archived quizzes nobody references.
    pub archived_unlinked_quizzes: u64,
}

/// Counts-only view of an [`AuditReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total_episodes: u64,
    pub total_quizzes: u64,
    pub episodes_without_quizzes: usize,
    pub orphaned_quizzes: usize,
    pub shared_quizzes: usize,
    pub broken_links: usize,
    pub archived_unlinked_quizzes: u64,
    pub is_clean: bool,
}

/// Response body of the audit endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    pub summary: AuditSummary,
    pub details: AuditReport,
    pub recommendations: Vec<String>,
}

impl AuditReport {
    /// No gaps of any kind: every episode linked, no orphans, no sharing, no broken links.
    pub fn is_clean(&self) -> bool {
        self.episodes_without_quizzes.is_empty()
            && self.orphaned_quizzes.is_empty()
            && self.shared_quizzes.is_empty()
            && self.broken_links.is_empty()
    }

    pub fn summary(&self) -> AuditSummary {
        AuditSummary {
            total_episodes: self.total_episodes,
            total_quizzes: self.total_quizzes,
            episodes_without_quizzes: self.episodes_without_quizzes.len(),
            orphaned_quizzes: self.orphaned_quizzes.len(),
            shared_quizzes: self.shared_quizzes.len(),
            broken_links: self.broken_links.len(),
            archived_unlinked_quizzes: self.archived_unlinked_quizzes,
            is_clean: self.is_clean(),
        }
    }

    pub fn orphan_completions(&self) -> u64 {
        self.orphaned_quizzes.iter().map(|q| q.completion_count).sum()
    }

    pub fn into_response(self) -> AuditResponse {
        AuditResponse {
            summary: self.summary(),
            recommendations: recommendations(&self),
            details: self,
        }
    }
}

/// Reads the current relationship state. Any read error aborts the audit.
pub async fn audit<C: ConnectionTrait>(db: &C) -> Result<AuditReport, DbErr> {
    let episodes = EpisodeModel::all(db).await?;
    let quizzes = QuizModel::all(db).await?;

    let quiz_ids: HashSet<i64> = quizzes.iter().map(|q| q.id).collect();
    let mut references: BTreeMap<i64, u64> = BTreeMap::new();
    let mut episodes_without_quizzes = Vec::new();
    let mut broken_links = Vec::new();

    for episode in &episodes {
        match episode.quiz_id {
            None => episodes_without_quizzes.push(EpisodeRef {
                id: episode.id,
                title: episode.title.clone(),
            }),
            Some(quiz_id) => {
                *references.entry(quiz_id).or_default() += 1;
                if !quiz_ids.contains(&quiz_id) {
                    broken_links.push(BrokenLink {
                        episode_id: episode.id,
                        title: episode.title.clone(),
                        quiz_id,
                    });
                }
            }
        }
    }

    let shared_quizzes = references
        .iter()
        .filter(|&(id, &count)| count > 1 && quiz_ids.contains(id))
        .map(|(&quiz_id, &episode_count)| SharedQuiz {
            quiz_id,
            episode_count,
        })
        .collect();

    let mut orphaned_quizzes = Vec::new();
    let mut archived_unlinked_quizzes = 0;
    for quiz in quizzes.iter().filter(|q| !references.contains_key(&q.id)) {
        if archive::is_archived(quiz) {
            archived_unlinked_quizzes += 1;
        } else {
            orphaned_quizzes.push(OrphanedQuiz {
                id: quiz.id,
                title: quiz.title.clone(),
                completion_count: CompletionModel::count_for_quiz(db, quiz.id).await?,
            });
        }
    }

    Ok(AuditReport {
        total_episodes: episodes.len() as u64,
        total_quizzes: quizzes.len() as u64,
        episodes_without_quizzes,
        orphaned_quizzes,
        shared_quizzes,
        broken_links,
        archived_unlinked_quizzes,
    })
}

/// Operator-facing advice derived from an audit.
pub fn recommendations(report: &AuditReport) -> Vec<String> {
    let mut out = Vec::new();

    if !report.broken_links.is_empty() {
        out.push(format!(
            "Fix {} episode(s) that point at missing quizzes before migrating; the quiz link cannot be enforced while they exist.",
            report.broken_links.len()
        ));
    }

    if !report.episodes_without_quizzes.is_empty() {
        out.push(format!(
            "Run the migration to create inactive placeholder quizzes for {} episode(s) without a quiz.",
            report.episodes_without_quizzes.len()
        ));
    }

    if !report.orphaned_quizzes.is_empty() {
        let completions = report.orphan_completions();
        if completions > 0 {
            out.push(format!(
                "{} orphaned quiz(zes) will be archived, not deleted; they hold {completions} recorded completion(s).",
                report.orphaned_quizzes.len()
            ));
        } else {
            out.push(format!(
                "{} orphaned quiz(zes) will be archived by the migration.",
                report.orphaned_quizzes.len()
            ));
        }
    }

    if !report.shared_quizzes.is_empty() {
        out.push(format!(
            "{} quiz(zes) are shared by several episodes; the migration leaves them as they are, split them manually.",
            report.shared_quizzes.len()
        ));
    }

    if out.is_empty() {
        out.push("No relationship issues found.".to_owned());
    }

    out
}
