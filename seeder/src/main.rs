use crate::seed::{Seeder, run_seeder};
use crate::seeds::{
    completion::CompletionSeeder, episode::EpisodeSeeder, quiz::QuizSeeder,
};
use colored::*;
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use util::config;

mod seed;
mod seeds;

/// Seeds an unmigrated dataset: linked episodes, episodes without a quiz,
/// orphaned quizzes (some with completions) and recent completions.
#[tokio::main]
async fn main() {
    let db = match db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{} {e}", "Failed to connect:".red());
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(&db, None).await {
        eprintln!("{} {e}", "Failed to apply migrations:".red());
        std::process::exit(1);
    }

    println!("Seeding {}", config::database_path().as_str().bold());

    for (seeder, name) in [
        (Box::new(QuizSeeder) as Box<dyn Seeder + Send + Sync>, "Quiz"),
        (Box::new(EpisodeSeeder), "Episode"),
        (Box::new(CompletionSeeder), "QuizCompletion"),
    ] {
        run_seeder(&*seeder, name, &db).await;
    }
}
