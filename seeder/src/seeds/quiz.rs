use crate::seed::Seeder;
use crate::seeds::TOPICS;
use db::models::quiz::Model;
use fake::{Fake, faker::lorem::en::Sentence};
use sea_orm::{DatabaseConnection, DbErr};

pub struct QuizSeeder;

#[async_trait::async_trait]
impl Seeder for QuizSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        for topic in TOPICS {
            let description: String = Sentence(6..12).fake();
            Model::create(db, topic, Some(&description), true).await?;
        }
        Ok(())
    }
}
