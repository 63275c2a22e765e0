use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

/// Assessment attached to an episode, represented by the `quizzes` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quizzes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Inactive quizzes are hidden from listeners (placeholders and archived quizzes).
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::episode::Entity")]
    Episode,

    #[sea_orm(has_many = "super::quiz_completion::Entity")]
    QuizCompletion,
}

impl Related<super::episode::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Episode.def()
    }
}

impl Related<super::quiz_completion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuizCompletion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        title: &str,
        description: Option<&str>,
        is_active: bool,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            title: Set(title.to_owned()),
            description: Set(description.map(str::to_owned)),
            is_active: Set(is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// All quizzes ordered by id.
    pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        Entity::find().order_by_asc(Column::Id).all(db).await
    }

    pub async fn count_all<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        Entity::find().count(db).await
    }

    /// Rewrites the listener-facing fields in one update.
    pub async fn set_presentation<C: ConnectionTrait>(
        db: &C,
        id: i64,
        title: &str,
        description: Option<&str>,
        is_active: bool,
    ) -> Result<Self, DbErr> {
        let Some(quiz) = Self::get_by_id(db, id).await? else {
            return Err(DbErr::RecordNotFound(format!("Quiz {id} not found")));
        };

        let mut active: ActiveModel = quiz.into();
        active.title = Set(title.to_owned());
        active.description = Set(description.map(str::to_owned));
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: i64) -> Result<(), DbErr> {
        let res = Entity::delete_by_id(id).exec(db).await?;
        if res.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("Quiz {id} not found")));
        }
        Ok(())
    }
}
