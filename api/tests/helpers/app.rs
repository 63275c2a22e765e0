use api::{auth::generate_jwt, routes::routes};
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use db::models::{episode::Model as EpisodeModel, quiz::Model as QuizModel};
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use util::{config::AppConfig, state::AppState};

pub const TEST_JWT_SECRET: &str = "podcast-quiz-test-secret";

/// Router mounted under `/api` over a fresh, fully migrated in-memory database.
pub async fn make_test_app() -> (Router, AppState) {
    AppConfig::set_jwt_secret(TEST_JWT_SECRET);
    AppConfig::set_jwt_duration_minutes(60);

    let db = setup_test_db().await;
    let app_state = AppState::new(db);
    let app = Router::new().nest("/api", routes(app_state.clone()));

    (app, app_state)
}

pub fn admin_token() -> String {
    generate_jwt(1, true).unwrap().0
}

pub fn listener_token() -> String {
    generate_jwt(2, false).unwrap().0
}

pub fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn authed_post(uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"));

    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Ids of the reference dataset: E1 linked to Q1, E2/E3 without a quiz, Q2 orphaned.
pub struct Seeded {
    pub e2: i64,
    pub e3: i64,
    pub q2: i64,
}

pub async fn seed_unmigrated(db: &DatabaseConnection) -> Seeded {
    let q1 = QuizModel::create(db, "Bovine lameness", None, true).await.unwrap();
    let q2 = QuizModel::create(db, "Avian influenza", Some("Biosecurity basics"), true)
        .await
        .unwrap();
    EpisodeModel::create(db, "Hoof care", None, None, Some(q1.id)).await.unwrap();
    let e2 = EpisodeModel::create(db, "Flock health", None, None, None).await.unwrap();
    let e3 = EpisodeModel::create(db, "Vaccine storage", None, None, None).await.unwrap();

    Seeded {
        e2: e2.id,
        e3: e3.id,
        q2: q2.id,
    }
}
