//! Archive markers for quizzes that are retired instead of deleted.
//!
//! An archived quiz is inactive, its title gains [`ARCHIVED_PREFIX`] and its
//! description ends with a note starting with [`ARCHIVE_NOTE_MARKER`]. The note
//! is the only thing that decides whether a quiz is archived, and it records
//! whether the quiz was active beforehand. Unarchiving removes exactly one
//! prefix and exactly the separator plus note, so titles and descriptions come
//! back byte for byte.

use chrono::{DateTime, Utc};
use db::models::quiz::Model as QuizModel;
use sea_orm::{ConnectionTrait, DbErr};

pub const ARCHIVED_PREFIX: &str = "[ARCHIVED] ";
pub const ARCHIVE_NOTE_MARKER: &str = "[Archived by podcast-quiz ";

/// Placed between an existing description and the note.
const NOTE_SEPARATOR: &str = "\n\n";
const WAS_INACTIVE: &str = "; quiz was inactive before archiving";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveReason {
    /// No episode references the quiz.
    Orphaned,
    /// A placeholder removed by rollback that listeners had already completed.
    UsedPlaceholder,
}

impl ArchiveReason {
    fn describe(self, completions: u64, date: &str) -> String {
        match self {
            ArchiveReason::Orphaned => format!(
                "migration on {date}: no episode references this quiz; {completions} recorded completion(s)"
            ),
            ArchiveReason::UsedPlaceholder => format!(
                "rollback on {date}: placeholder quiz kept because it has {completions} recorded completion(s)"
            ),
        }
    }
}

/// What an archive note says about the quiz before it was archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveNote<'a> {
    pub original_description: Option<&'a str>,
    pub was_active: bool,
}

/// Finds the trailing archive note in `description`, if there is one.
pub fn parse_note(description: &str) -> Option<ArchiveNote<'_>> {
    let pos = description.rfind(ARCHIVE_NOTE_MARKER)?;
    let note = &description[pos..];
    if !note.ends_with(']') || note.contains('\n') {
        return None;
    }

    let original_description = if pos == 0 {
        None
    } else {
        Some(description[..pos].strip_suffix(NOTE_SEPARATOR)?)
    };

    Some(ArchiveNote {
        original_description,
        was_active: !note.ends_with(&format!("{WAS_INACTIVE}]")),
    })
}

pub fn is_archived(quiz: &QuizModel) -> bool {
    quiz.description.as_deref().and_then(parse_note).is_some()
}

pub fn archived_title(title: &str) -> String {
    format!("{ARCHIVED_PREFIX}{title}")
}

pub fn restored_title(title: &str) -> String {
    title.strip_prefix(ARCHIVED_PREFIX).unwrap_or(title).to_owned()
}

pub fn archived_description(
    description: Option<&str>,
    was_active: bool,
    reason: ArchiveReason,
    completions: u64,
    at: DateTime<Utc>,
) -> String {
    let date = at.format("%Y-%m-%d").to_string();
    let inactive = if was_active { "" } else { WAS_INACTIVE };
    let note = format!(
        "{ARCHIVE_NOTE_MARKER}{}{inactive}]",
        reason.describe(completions, &date)
    );

    match description {
        Some(existing) => format!("{existing}{NOTE_SEPARATOR}{note}"),
        None => note,
    }
}

/// Archives `quiz` in place. A quiz that already carries a note is left untouched.
pub async fn archive_quiz<C: ConnectionTrait>(
    db: &C,
    quiz: &QuizModel,
    reason: ArchiveReason,
    completions: u64,
) -> Result<QuizModel, DbErr> {
    if is_archived(quiz) {
        return Ok(quiz.clone());
    }

    let title = archived_title(&quiz.title);
    let description = archived_description(
        quiz.description.as_deref(),
        quiz.is_active,
        reason,
        completions,
        Utc::now(),
    );
    QuizModel::set_presentation(db, quiz.id, &title, Some(&description), false).await
}

/// Reverses [`archive_quiz`], restoring title, description and active flag.
pub async fn unarchive_quiz<C: ConnectionTrait>(
    db: &C,
    quiz: &QuizModel,
) -> Result<QuizModel, DbErr> {
    let Some(note) = quiz.description.as_deref().and_then(parse_note) else {
        return Ok(quiz.clone());
    };

    let title = restored_title(&quiz.title);
    let description = note.original_description.map(str::to_owned);
    QuizModel::set_presentation(db, quiz.id, &title, description.as_deref(), note.was_active).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use db::test_utils::setup_test_db;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
    }

    #[test]
    fn title_prefix_strips_exactly_once() {
        let once = archived_title("Bovine respiratory disease");
        assert_eq!(once, "[ARCHIVED] Bovine respiratory disease");
        assert_eq!(restored_title(&once), "Bovine respiratory disease");

        let twice = archived_title("[ARCHIVED] Legacy quiz");
        assert_eq!(restored_title(&twice), "[ARCHIVED] Legacy quiz");
    }

    #[test]
    fn restored_title_leaves_unmarked_titles_alone() {
        assert_eq!(restored_title("Plain title"), "Plain title");
    }

    #[test]
    fn note_appends_as_new_paragraph() {
        let archived = archived_description(
            Some("Covers BRD vaccination protocols."),
            true,
            ArchiveReason::Orphaned,
            4,
            at(),
        );

        assert!(archived.starts_with(
            "Covers BRD vaccination protocols.\n\n[Archived by podcast-quiz migration on 2025-03-14"
        ));
        assert!(archived.contains("4 recorded completion(s)]"));
    }

    #[test]
    fn descriptions_round_trip_exactly() {
        for original in [None, Some(""), Some("   "), Some("Notes\n"), Some("Line one\n\nLine two")] {
            for was_active in [true, false] {
                let archived =
                    archived_description(original, was_active, ArchiveReason::Orphaned, 1, at());
                let note = parse_note(&archived).unwrap();

                assert_eq!(note.original_description, original, "{archived:?}");
                assert_eq!(note.was_active, was_active, "{archived:?}");
            }
        }
    }

    #[test]
    fn plain_descriptions_carry_no_note() {
        assert_eq!(parse_note("Regular description"), None);
        assert_eq!(parse_note(""), None);
        assert_eq!(parse_note("[Archived by podcast-quiz but then\nedited by hand]"), None);
    }

    #[test]
    fn used_placeholder_note_records_inactive_origin() {
        let archived = archived_description(None, false, ArchiveReason::UsedPlaceholder, 1, at());

        assert!(archived.starts_with(ARCHIVE_NOTE_MARKER));
        assert!(archived.contains("rollback on 2025-03-14"));
        assert_eq!(
            parse_note(&archived),
            Some(ArchiveNote {
                original_description: None,
                was_active: false
            })
        );
    }

    #[tokio::test]
    async fn archive_then_unarchive_restores_every_field() {
        let db = setup_test_db().await;
        let quiz = QuizModel::create(&db, "[ARCHIVED] Legacy quiz", Some("Notes\n"), false)
            .await
            .unwrap();

        let archived = archive_quiz(&db, &quiz, ArchiveReason::Orphaned, 0).await.unwrap();
        assert!(is_archived(&archived));
        assert_eq!(archived.title, "[ARCHIVED] [ARCHIVED] Legacy quiz");

        let again = archive_quiz(&db, &archived, ArchiveReason::Orphaned, 0).await.unwrap();
        assert_eq!(again.title, archived.title);
        assert_eq!(again.description, archived.description);

        let restored = unarchive_quiz(&db, &again).await.unwrap();
        assert_eq!(restored.title, "[ARCHIVED] Legacy quiz");
        assert_eq!(restored.description.as_deref(), Some("Notes\n"));
        assert!(!restored.is_active);
        assert!(!is_archived(&restored));
    }

    #[tokio::test]
    async fn unarchive_leaves_unarchived_quiz_alone() {
        let db = setup_test_db().await;
        let quiz = QuizModel::create(&db, "[ARCHIVED] Hand named", None, true).await.unwrap();

        let same = unarchive_quiz(&db, &quiz).await.unwrap();

        assert_eq!(same, quiz);
    }
}
