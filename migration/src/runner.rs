use colored::*;
use migration::Migrator;
use sea_orm_migration::prelude::*;
use std::io::{self, Write};
use std::time::Instant;

const STATUS_COLUMN: usize = 80;

pub async fn run_all_migrations(url: &str) {
    let db = sea_orm::Database::connect(url)
        .await
        .expect("DB connection failed");

    let pending = Migrator::get_pending_migrations(&db)
        .await
        .expect("Failed to read migration status");

    if pending.is_empty() {
        println!("Nothing to migrate.");
        return;
    }

    println!("Running migrations...");
    for migration in pending {
        run_migration(&db, migration.name()).await;
    }
}

async fn run_migration(db: &sea_orm::DatabaseConnection, name: &str) {
    let name_str = format!("Applying {}", name.bold());
    let dots = ".".repeat(STATUS_COLUMN.saturating_sub(name_str.len()));
    print!("{}{} ", name_str, dots);
    io::stdout().flush().ok();

    let start = Instant::now();
    // Pending migrations apply in order, so one step applies exactly `name`.
    match Migrator::up(db, Some(1)).await {
        Ok(()) => {
            let time_str = format!("({:.2?})", start.elapsed()).dimmed();
            println!("{} {}", "done".green(), time_str);
        }
        Err(err) => {
            println!("{}", "failed".red());
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
