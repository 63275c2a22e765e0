use crate::seed::Seeder;
use crate::seeds::LINKED;
use chrono::{Duration, Utc};
use db::models::{quiz::Model as QuizModel, quiz_completion::Model};
use sea_orm::{DatabaseConnection, DbErr};

pub struct CompletionSeeder;

#[async_trait::async_trait]
impl Seeder for CompletionSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let quizzes = QuizModel::all(db).await?;

        for (n, quiz) in quizzes.iter().enumerate() {
            // Every other orphan keeps a history so archiving has something to protect.
            let completions = match n {
                n if n < LINKED => fastrand::usize(2..8),
                n if (n - LINKED) % 2 == 0 => fastrand::usize(1..4),
                _ => 0,
            };

            for _ in 0..completions {
                let user_id = fastrand::i64(1..500);
                let score = fastrand::i32(40..=100);
                let days_ago = fastrand::i64(2..120);
                Model::create_at(
                    db,
                    quiz.id,
                    user_id,
                    score,
                    Utc::now() - Duration::days(days_ago),
                )
                .await?;
            }
        }

        // One fresh completion so validation's recent-activity check has something to report.
        if let Some(quiz) = quizzes.first() {
            Model::create(db, quiz.id, 1, 90).await?;
        }

        Ok(())
    }
}
