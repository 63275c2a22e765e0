use db::models::{episode::Model as EpisodeModel, quiz::Model as QuizModel};
use sea_orm::DatabaseConnection;

/// E1 linked to Q1, E2 and E3 without a quiz, Q2 orphaned with no completions.
pub struct Scenario {
    pub e1: EpisodeModel,
    pub e2: EpisodeModel,
    pub e3: EpisodeModel,
    pub q1: QuizModel,
    pub q2: QuizModel,
}

pub async fn seed_scenario(db: &DatabaseConnection) -> Scenario {
    let q1 = QuizModel::create(db, "Canine parvovirus", Some("Five questions"), true)
        .await
        .unwrap();
    let q2 = QuizModel::create(db, "Feline asthma", None, true).await.unwrap();

    let e1 = EpisodeModel::create(db, "Parvo in shelters", None, Some("e1.mp3"), Some(q1.id))
        .await
        .unwrap();
    let e2 = EpisodeModel::create(db, "Dental radiography", None, Some("e2.mp3"), None)
        .await
        .unwrap();
    let e3 = EpisodeModel::create(db, "Exotic anaesthesia", Some("Rabbits and ferrets"), None, None)
        .await
        .unwrap();

    Scenario { e1, e2, e3, q1, q2 }
}

/// Every row of both tables, for before/after comparisons.
pub async fn rows(db: &DatabaseConnection) -> (Vec<EpisodeModel>, Vec<QuizModel>) {
    (
        EpisodeModel::all(db).await.unwrap(),
        QuizModel::all(db).await.unwrap(),
    )
}
