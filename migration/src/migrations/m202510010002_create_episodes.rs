// Episodes start with an optional quiz link; the podcast-quiz refactor tightens it later.
use sea_orm_migration::prelude::*;

use crate::tables::{Episodes, QuizLink, episodes_quiz_index, episodes_table};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010002_create_episodes"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(episodes_table("episodes", &QuizLink::loose()))
            .await?;

        manager.create_index(episodes_quiz_index()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Episodes::Table).to_owned())
            .await
    }
}
