use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

/// Podcast episode, represented by the `episodes` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "episodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub audio_url: Option<String>,
    /// Linked quiz. Nullable until the podcast-quiz refactor has run.
    pub quiz_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quiz::Entity",
        from = "Column::QuizId",
        to = "super::quiz::Column::Id"
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
        title: &str,
        description: Option<&str>,
        audio_url: Option<&str>,
        quiz_id: Option<i64>,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            title: Set(title.to_owned()),
            description: Set(description.map(str::to_owned)),
            audio_url: Set(audio_url.map(str::to_owned)),
            quiz_id: Set(quiz_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// All episodes ordered by id.
    pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        Entity::find().order_by_asc(Column::Id).all(db).await
    }

    /// Points an episode at `quiz_id` (or clears the link).
    pub async fn set_quiz<C: ConnectionTrait>(
        db: &C,
        id: i64,
        quiz_id: Option<i64>,
    ) -> Result<Self, DbErr> {
        let Some(episode) = Self::get_by_id(db, id).await? else {
            return Err(DbErr::RecordNotFound(format!("Episode {id} not found")));
        };

        let mut active: ActiveModel = episode.into();
        active.quiz_id = Set(quiz_id);
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    /// Nulls `quiz_id` on every episode pointing at `quiz_id`. Returns the number of episodes touched.
    pub async fn clear_quiz_links<C: ConnectionTrait>(db: &C, quiz_id: i64) -> Result<u64, DbErr> {
        let res = Entity::update_many()
            .col_expr(Column::QuizId, Expr::value(Option::<i64>::None))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::QuizId.eq(quiz_id))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }
}
