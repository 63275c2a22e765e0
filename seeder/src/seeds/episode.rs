use crate::seed::Seeder;
use crate::seeds::{LINKED, UNLINKED_EPISODES};
use db::models::{episode::Model, quiz::Model as QuizModel};
use fake::{Fake, faker::lorem::en::Sentence};
use sea_orm::{DatabaseConnection, DbErr};

pub struct EpisodeSeeder;

#[async_trait::async_trait]
impl Seeder for EpisodeSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let quizzes = QuizModel::all(db).await?;

        // Linked episodes; the remaining quizzes stay orphaned.
        for (n, quiz) in quizzes.iter().take(LINKED).enumerate() {
            let description: String = Sentence(8..16).fake();
            Model::create(
                db,
                &format!("Ep {}: {}", n + 1, quiz.title),
                Some(&description),
                Some(&format!("audio/episode-{}.mp3", n + 1)),
                Some(quiz.id),
            )
            .await?;
        }

        for n in 0..UNLINKED_EPISODES {
            let number = LINKED + n + 1;
            let title: String = Sentence(2..5).fake();
            Model::create(
                db,
                &format!("Ep {number}: {}", title.trim_end_matches('.')),
                None,
                Some(&format!("audio/episode-{number}.mp3")),
                None,
            )
            .await?;
        }

        Ok(())
    }
}
