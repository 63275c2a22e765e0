//! Table identifiers and shared table builders.
//!
//! The `episodes` table is built from [`episodes_table`] both by the initial
//! schema migration and by the SQLite table rebuild the quiz refactor uses to
//! change the shape of the `quiz_id` link, so the two can never drift apart.

use sea_orm_migration::prelude::*;

pub const EPISODES_QUIZ_FK: &str = "fk_episodes_quiz";
pub const EPISODES_QUIZ_INDEX: &str = "idx_episodes_quiz_id";

#[derive(DeriveIden, Clone, Copy)]
pub enum Quizzes {
    Table,
    Id,
    Title,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Episodes {
    Table,
    Id,
    Title,
    Description,
    AudioUrl,
    QuizId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum QuizCompletions {
    Table,
    Id,
    QuizId,
    UserId,
    Score,
    CompletedAt,
}

/// Every column of `episodes`, in declaration order.
pub const EPISODE_COLUMNS: [Episodes; 7] = [
    Episodes::Id,
    Episodes::Title,
    Episodes::Description,
    Episodes::AudioUrl,
    Episodes::QuizId,
    Episodes::CreatedAt,
    Episodes::UpdatedAt,
];

/// Foreign key from `episodes.quiz_id` to `quizzes.id`.
#[derive(Debug, Clone)]
pub struct QuizForeignKey {
    pub name: String,
    pub on_delete: ForeignKeyAction,
    pub on_update: ForeignKeyAction,
}

/// Shape of the `episodes.quiz_id` column and its foreign key.
#[derive(Debug, Clone)]
pub struct QuizLink {
    pub nullable: bool,
    pub foreign_key: Option<QuizForeignKey>,
}

impl QuizLink {
    /// Shape before the podcast-quiz refactor: optional link, nulled when the quiz goes away.
    pub fn loose() -> Self {
        Self {
            nullable: true,
            foreign_key: Some(QuizForeignKey {
                name: EPISODES_QUIZ_FK.to_owned(),
                on_delete: ForeignKeyAction::SetNull,
                on_update: ForeignKeyAction::Cascade,
            }),
        }
    }
}

/// Builds the `CREATE TABLE` statement for `episodes` under `table_name`.
pub fn episodes_table(table_name: &str, link: &QuizLink) -> TableCreateStatement {
    let mut quiz_id = ColumnDef::new(Episodes::QuizId);
    quiz_id.big_integer();
    if link.nullable {
        quiz_id.null();
    } else {
        quiz_id.not_null();
    }

    let mut stmt = Table::create();
    stmt.table(Alias::new(table_name))
        .if_not_exists()
        .col(
            ColumnDef::new(Episodes::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Episodes::Title).string().not_null())
        .col(ColumnDef::new(Episodes::Description).text().null())
        .col(ColumnDef::new(Episodes::AudioUrl).string().null())
        .col(quiz_id)
        .col(
            ColumnDef::new(Episodes::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Episodes::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        );

    if let Some(fk) = &link.foreign_key {
        stmt.foreign_key(
            ForeignKey::create()
                .name(fk.name.as_str())
                .from(Alias::new(table_name), Episodes::QuizId)
                .to(Quizzes::Table, Quizzes::Id)
                .on_delete(fk.on_delete.clone())
                .on_update(fk.on_update.clone()),
        );
    }

    stmt.to_owned()
}

/// Index over `episodes.quiz_id`, used by every orphan and shared-quiz lookup.
pub fn episodes_quiz_index() -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .name(EPISODES_QUIZ_INDEX)
        .table(Episodes::Table)
        .col(Episodes::QuizId)
        .to_owned()
}
