use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, PaginatorTrait, Set};
use serde::{Deserialize, Serialize};

/// A listener finishing a quiz. Presence of completions marks a quiz as used.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz_completions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub score: i32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quiz::Entity",
        from = "Column::QuizId",
        to = "super::quiz::Column::Id",
        on_delete = "Cascade"
    )]
    Quiz,
}

impl Related<super::quiz::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        quiz_id: i64,
        user_id: i64,
        score: i32,
    ) -> Result<Self, DbErr> {
        Self::create_at(db, quiz_id, user_id, score, Utc::now()).await
    }

    pub async fn create_at<C: ConnectionTrait>(
        db: &C,
        quiz_id: i64,
        user_id: i64,
        score: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            quiz_id: Set(quiz_id),
            user_id: Set(user_id),
            score: Set(score),
            completed_at: Set(completed_at),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn count_for_quiz<C: ConnectionTrait>(db: &C, quiz_id: i64) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::QuizId.eq(quiz_id))
            .count(db)
            .await
    }

    pub async fn count_since<C: ConnectionTrait>(
        db: &C,
        since: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::CompletedAt.gte(since))
            .count(db)
            .await
    }
}
