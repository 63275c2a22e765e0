pub mod models;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection, DbErr};
use std::path::Path;
use util::config;

/// Connects to the configured database.
///
/// A plain `DATABASE_PATH` is treated as a SQLite file, its parent directory
/// is created first since SQLite won't create intermediate dirs.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let path_or_url = config::database_path();
    if config::is_sqlite_file(&path_or_url) {
        if let Some(parent) = Path::new(&path_or_url).parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbErr::Custom(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }

    tracing::debug!(database = %path_or_url, "Connecting to database");
    Database::connect(config::database_url()).await
}
