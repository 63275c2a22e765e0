use sea_orm_migration::prelude::*;

use crate::tables::{QuizCompletions, Quizzes};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010003_create_quiz_completions"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(QuizCompletions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuizCompletions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(QuizCompletions::QuizId)
                            .big_integer()
                            .not_null(),
                    )
                    // Issued by the external auth provider, no local users table.
                    .col(
                        ColumnDef::new(QuizCompletions::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuizCompletions::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(QuizCompletions::CompletedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quiz_completions_quiz")
                            .from(QuizCompletions::Table, QuizCompletions::QuizId)
                            .to(Quizzes::Table, Quizzes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quiz_completions_quiz_id")
                    .table(QuizCompletions::Table)
                    .col(QuizCompletions::QuizId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QuizCompletions::Table).to_owned())
            .await
    }
}
