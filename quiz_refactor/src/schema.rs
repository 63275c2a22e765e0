//! Typed schema administration for the `episodes.quiz_id` link.
//!
//! Only a fixed set of DDL changes is ever needed, so they are modelled as
//! [`SchemaChange`] values rather than SQL strings. PostgreSQL applies each
//! change as an `ALTER TABLE`. SQLite cannot alter constraints, so the changes
//! are folded into a target [`QuizLink`] and `episodes` is rebuilt from the
//! same table builder the schema migration uses.
//!
//! Introspection is the only place raw SQL is issued (`PRAGMA` on SQLite,
//! `information_schema` on PostgreSQL).

use migration::tables::{
    EPISODE_COLUMNS, EPISODES_QUIZ_FK, Episodes, QuizForeignKey, QuizLink, Quizzes,
    episodes_quiz_index, episodes_table,
};
use sea_orm::sea_query::{
    Alias, ColumnDef, ForeignKey, ForeignKeyAction, Query, Table,
};
use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement, StatementBuilder};
use serde::{Deserialize, Serialize};

const EPISODES_TABLE: &str = "episodes";
const QUIZ_ID_COLUMN: &str = "quiz_id";
const REBUILD_TABLE: &str = "episodes_rebuild";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "NO ACTION")]
    NoAction,
}

impl ReferentialAction {
    pub fn as_sql(self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }

    /// Parses the rule names reported by SQLite and `information_schema`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().replace('_', " ").as_str() {
            "CASCADE" => Some(ReferentialAction::Cascade),
            "SET NULL" => Some(ReferentialAction::SetNull),
            "SET DEFAULT" => Some(ReferentialAction::SetDefault),
            "RESTRICT" => Some(ReferentialAction::Restrict),
            "NO ACTION" => Some(ReferentialAction::NoAction),
            _ => None,
        }
    }

    fn to_foreign_key_action(self) -> ForeignKeyAction {
        match self {
            ReferentialAction::Cascade => ForeignKeyAction::Cascade,
            ReferentialAction::SetNull => ForeignKeyAction::SetNull,
            ReferentialAction::SetDefault => ForeignKeyAction::SetDefault,
            ReferentialAction::Restrict => ForeignKeyAction::Restrict,
            ReferentialAction::NoAction => ForeignKeyAction::NoAction,
        }
    }
}

/// A foreign key from `episodes.quiz_id` as found in the live schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintDefinition {
    /// SQLite does not report constraint names; the schema's canonical name is recorded instead.
    #[serde(default)]
    pub name: Option<String>,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
    /// Textual form, for operators reading a rollback payload.
    #[serde(default)]
    pub definition: String,
}

impl ConstraintDefinition {
    pub fn new(
        name: Option<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
        on_delete: ReferentialAction,
        on_update: ReferentialAction,
    ) -> Self {
        let mut def = Self {
            name,
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
            on_delete,
            on_update,
            definition: String::new(),
        };
        def.definition = def.describe();
        def
    }

    pub fn describe(&self) -> String {
        let prefix = match &self.name {
            Some(name) => format!("CONSTRAINT {name} "),
            None => String::new(),
        };
        format!(
            "{prefix}FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
            self.column,
            self.referenced_table,
            self.referenced_column,
            self.on_delete.as_sql(),
            self.on_update.as_sql()
        )
    }
}

/// Live shape of the `episodes.quiz_id` column.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizLinkState {
    pub table: String,
    pub column: String,
    pub data_type: String,
    pub nullable: bool,
    pub constraints: Vec<ConstraintDefinition>,
}

impl QuizLinkState {
    /// `NOT NULL` with a cascading foreign key: the post-migration shape.
    pub fn is_enforced(&self) -> bool {
        !self.nullable
            && self
                .constraints
                .iter()
                .any(|c| c.on_delete == ReferentialAction::Cascade)
    }

    fn as_link(&self) -> QuizLink {
        QuizLink {
            nullable: self.nullable,
            foreign_key: self.constraints.first().map(|c| QuizForeignKey {
                name: c.name.clone().unwrap_or_else(|| EPISODES_QUIZ_FK.to_owned()),
                on_delete: c.on_delete.to_foreign_key_action(),
                on_update: c.on_update.to_foreign_key_action(),
            }),
        }
    }
}

/// Desired foreign key for [`SchemaChange::AddQuizForeignKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyShape {
    pub name: String,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl ForeignKeyShape {
    /// Post-migration foreign key: deleting a quiz deletes its episode.
    pub fn cascading() -> Self {
        Self {
            name: EPISODES_QUIZ_FK.to_owned(),
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::Cascade,
        }
    }

    /// Pre-migration foreign key rebuilt from a snapshot, always `ON DELETE SET NULL`.
    pub fn restored_from(snapshot: &ConstraintDefinition) -> Self {
        Self {
            name: snapshot
                .name
                .clone()
                .unwrap_or_else(|| EPISODES_QUIZ_FK.to_owned()),
            on_delete: ReferentialAction::SetNull,
            on_update: snapshot.on_update,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaChange {
    DropQuizForeignKey,
    SetQuizIdNotNull,
    DropQuizIdNotNull,
    AddQuizForeignKey(ForeignKeyShape),
}

/// Reads the current shape of `episodes.quiz_id`.
pub async fn inspect<C: ConnectionTrait>(db: &C) -> Result<QuizLinkState, DbErr> {
    match db.get_database_backend() {
        DbBackend::Sqlite => inspect_sqlite(db).await,
        DbBackend::Postgres => inspect_postgres(db).await,
        DbBackend::MySql => Err(unsupported_backend()),
    }
}

/// Applies `changes` in order and returns the resulting shape.
pub async fn apply_changes<C: ConnectionTrait>(
    db: &C,
    changes: &[SchemaChange],
) -> Result<QuizLinkState, DbErr> {
    let current = inspect(db).await?;

    match db.get_database_backend() {
        DbBackend::Sqlite => {
            let target = fold_changes(current.as_link(), changes);
            rebuild_sqlite(db, &target).await?;
        }
        DbBackend::Postgres => {
            for change in changes {
                alter_postgres(db, &current, change).await?;
            }
        }
        DbBackend::MySql => return Err(unsupported_backend()),
    }

    inspect(db).await
}

fn unsupported_backend() -> DbErr {
    DbErr::Custom("Quiz link administration supports SQLite and PostgreSQL only".into())
}

fn fold_changes(mut link: QuizLink, changes: &[SchemaChange]) -> QuizLink {
    for change in changes {
        match change {
            SchemaChange::DropQuizForeignKey => link.foreign_key = None,
            SchemaChange::SetQuizIdNotNull => link.nullable = false,
            SchemaChange::DropQuizIdNotNull => link.nullable = true,
            SchemaChange::AddQuizForeignKey(shape) => {
                link.foreign_key = Some(QuizForeignKey {
                    name: shape.name.clone(),
                    on_delete: shape.on_delete.to_foreign_key_action(),
                    on_update: shape.on_update.to_foreign_key_action(),
                })
            }
        }
    }
    link
}

async fn exec<C, S>(db: &C, stmt: &S) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    S: StatementBuilder,
{
    let backend = db.get_database_backend();
    db.execute(backend.build(stmt)).await?;
    Ok(())
}

// --- SQLite ---

async fn inspect_sqlite<C: ConnectionTrait>(db: &C) -> Result<QuizLinkState, DbErr> {
    let columns = db
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            format!("PRAGMA table_info(\"{EPISODES_TABLE}\")"),
        ))
        .await?;

    let mut column = None;
    for row in &columns {
        let name: String = row.try_get("", "name")?;
        if name == QUIZ_ID_COLUMN {
            let data_type: String = row.try_get("", "type")?;
            let not_null: i32 = row.try_get("", "notnull")?;
            column = Some((data_type, not_null == 0));
        }
    }
    let Some((data_type, nullable)) = column else {
        return Err(DbErr::Custom(format!(
            "{EPISODES_TABLE}.{QUIZ_ID_COLUMN} not found"
        )));
    };

    let fk_rows = db
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            format!("PRAGMA foreign_key_list(\"{EPISODES_TABLE}\")"),
        ))
        .await?;

    let mut constraints = Vec::new();
    for row in &fk_rows {
        let from: String = row.try_get("", "from")?;
        if from != QUIZ_ID_COLUMN {
            continue;
        }
        let table: String = row.try_get("", "table")?;
        let to: Option<String> = row.try_get("", "to")?;
        let on_delete: String = row.try_get("", "on_delete")?;
        let on_update: String = row.try_get("", "on_update")?;

        constraints.push(ConstraintDefinition::new(
            Some(EPISODES_QUIZ_FK.to_owned()),
            QUIZ_ID_COLUMN,
            table,
            to.unwrap_or_else(|| "id".to_owned()),
            ReferentialAction::parse(&on_delete).unwrap_or(ReferentialAction::NoAction),
            ReferentialAction::parse(&on_update).unwrap_or(ReferentialAction::NoAction),
        ));
    }

    Ok(QuizLinkState {
        table: EPISODES_TABLE.to_owned(),
        column: QUIZ_ID_COLUMN.to_owned(),
        data_type,
        nullable,
        constraints,
    })
}

/// Recreates `episodes` with `target` as its quiz link, keeping every row.
async fn rebuild_sqlite<C: ConnectionTrait>(db: &C, target: &QuizLink) -> Result<(), DbErr> {
    tracing::debug!(
        nullable = target.nullable,
        foreign_key = target.foreign_key.is_some(),
        "Rebuilding episodes table"
    );

    exec(db, &Table::drop().table(Alias::new(REBUILD_TABLE)).if_exists().to_owned()).await?;
    exec(db, &episodes_table(REBUILD_TABLE, target)).await?;

    let copy = Query::insert()
        .into_table(Alias::new(REBUILD_TABLE))
        .columns(EPISODE_COLUMNS)
        .select_from(
            Query::select()
                .columns(EPISODE_COLUMNS)
                .from(Episodes::Table)
                .to_owned(),
        )
        .map_err(|e| DbErr::Custom(format!("Failed to build episode copy: {e}")))?
        .to_owned();
    exec(db, &copy).await?;

    exec(db, &Table::drop().table(Episodes::Table).to_owned()).await?;
    exec(
        db,
        &Table::rename()
            .table(Alias::new(REBUILD_TABLE), Episodes::Table)
            .to_owned(),
    )
    .await?;
    exec(db, &episodes_quiz_index()).await
}

// --- PostgreSQL ---

async fn inspect_postgres<C: ConnectionTrait>(db: &C) -> Result<QuizLinkState, DbErr> {
    let column = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT is_nullable::text AS is_nullable, data_type::text AS data_type
               FROM information_schema.columns
               WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2"#,
            [EPISODES_TABLE.into(), QUIZ_ID_COLUMN.into()],
        ))
        .await?
        .ok_or_else(|| DbErr::Custom(format!("{EPISODES_TABLE}.{QUIZ_ID_COLUMN} not found")))?;

    let is_nullable: String = column.try_get("", "is_nullable")?;
    let data_type: String = column.try_get("", "data_type")?;

    let rows = db
        .query_all(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT tc.constraint_name::text AS name,
                      ccu.table_name::text AS referenced_table,
                      ccu.column_name::text AS referenced_column,
                      rc.delete_rule::text AS delete_rule,
                      rc.update_rule::text AS update_rule
               FROM information_schema.table_constraints tc
               JOIN information_schema.key_column_usage kcu
                 ON kcu.constraint_name = tc.constraint_name
                AND kcu.table_schema = tc.table_schema
               JOIN information_schema.referential_constraints rc
                 ON rc.constraint_name = tc.constraint_name
                AND rc.constraint_schema = tc.table_schema
               JOIN information_schema.constraint_column_usage ccu
                 ON ccu.constraint_name = tc.constraint_name
                AND ccu.constraint_schema = tc.table_schema
               WHERE tc.constraint_type = 'FOREIGN KEY'
                 AND tc.table_schema = current_schema()
                 AND tc.table_name = $1
                 AND kcu.column_name = $2
               ORDER BY tc.constraint_name"#,
            [EPISODES_TABLE.into(), QUIZ_ID_COLUMN.into()],
        ))
        .await?;

    let mut constraints = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.try_get("", "name")?;
        let referenced_table: String = row.try_get("", "referenced_table")?;
        let referenced_column: String = row.try_get("", "referenced_column")?;
        let delete_rule: String = row.try_get("", "delete_rule")?;
        let update_rule: String = row.try_get("", "update_rule")?;

        constraints.push(ConstraintDefinition::new(
            Some(name),
            QUIZ_ID_COLUMN,
            referenced_table,
            referenced_column,
            ReferentialAction::parse(&delete_rule).unwrap_or(ReferentialAction::NoAction),
            ReferentialAction::parse(&update_rule).unwrap_or(ReferentialAction::NoAction),
        ));
    }

    Ok(QuizLinkState {
        table: EPISODES_TABLE.to_owned(),
        column: QUIZ_ID_COLUMN.to_owned(),
        data_type,
        nullable: is_nullable.eq_ignore_ascii_case("YES"),
        constraints,
    })
}

async fn alter_postgres<C: ConnectionTrait>(
    db: &C,
    current: &QuizLinkState,
    change: &SchemaChange,
) -> Result<(), DbErr> {
    match change {
        SchemaChange::DropQuizForeignKey => {
            for name in current.constraints.iter().filter_map(|c| c.name.as_deref()) {
                exec(
                    db,
                    &ForeignKey::drop()
                        .name(name)
                        .table(Episodes::Table)
                        .to_owned(),
                )
                .await?;
            }
            Ok(())
        }
        SchemaChange::SetQuizIdNotNull => {
            exec(
                db,
                &Table::alter()
                    .table(Episodes::Table)
                    .modify_column(ColumnDef::new(Episodes::QuizId).big_integer().not_null())
                    .to_owned(),
            )
            .await
        }
        SchemaChange::DropQuizIdNotNull => {
            exec(
                db,
                &Table::alter()
                    .table(Episodes::Table)
                    .modify_column(ColumnDef::new(Episodes::QuizId).big_integer().null())
                    .to_owned(),
            )
            .await
        }
        SchemaChange::AddQuizForeignKey(shape) => {
            exec(
                db,
                &ForeignKey::create()
                    .name(shape.name.as_str())
                    .from(Episodes::Table, Episodes::QuizId)
                    .to(Quizzes::Table, Quizzes::Id)
                    .on_delete(shape.on_delete.to_foreign_key_action())
                    .on_update(shape.on_update.to_foreign_key_action())
                    .to_owned(),
            )
            .await
        }
    }
}
