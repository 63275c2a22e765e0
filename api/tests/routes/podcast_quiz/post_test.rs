#[cfg(test)]
mod tests {
    use axum::{
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use db::models::{
        episode::Model as EpisodeModel, quiz::Model as QuizModel,
        quiz_completion::Model as CompletionModel,
    };
    use serde_json::{Value, json};
    use serial_test::serial;
    use tower::ServiceExt;

    use crate::helpers::app::{admin_token, authed_post, body_json, make_test_app, seed_unmigrated};

    const MIGRATE: &str = "/api/admin/podcast-quiz/migrate";
    const ROLLBACK: &str = "/api/admin/podcast-quiz/rollback";

    #[tokio::test]
    #[serial]
    async fn dry_run_migration_reports_without_changing_rows() {
        let (app, state) = make_test_app().await;
        let seeded = seed_unmigrated(state.db()).await;
        let quizzes_before = QuizModel::all(state.db()).await.unwrap();

        let resp = app
            .oneshot(authed_post(
                MIGRATE,
                &admin_token(),
                Some(json!({ "dryRun": true })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["message"], "Dry run completed; no changes were kept");
        let data = &json["data"];
        assert_eq!(data["success"], true);
        assert_eq!(data["dryRun"], true);
        assert_eq!(data["summary"]["quizzesCreated"], 2);
        assert_eq!(data["summary"]["quizzesArchived"], 1);
        assert_eq!(data["postAudit"]["episodesWithoutQuizzes"], json!([]));
        assert!(!data["logs"].as_array().unwrap().is_empty());

        assert_eq!(QuizModel::all(state.db()).await.unwrap(), quizzes_before);
        let e2 = EpisodeModel::get_by_id(state.db(), seeded.e2).await.unwrap().unwrap();
        assert_eq!(e2.quiz_id, None);
    }

    #[tokio::test]
    #[serial]
    async fn migrate_then_rollback_round_trip() {
        let (app, state) = make_test_app().await;
        let seeded = seed_unmigrated(state.db()).await;
        let token = admin_token();

        let resp = app
            .clone()
            .oneshot(authed_post(MIGRATE, &token, Some(json!({}))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let migrated = body_json(resp).await;
        let rollback_data = migrated["data"]["rollbackData"].clone();
        assert_eq!(rollback_data["createdQuizzes"].as_array().unwrap().len(), 2);
        assert_eq!(rollback_data["archivedQuizzes"], json!([seeded.q2]));
        assert_eq!(
            rollback_data["originalConstraints"][0]["onDelete"],
            "SET NULL"
        );

        let q2 = QuizModel::get_by_id(state.db(), seeded.q2).await.unwrap().unwrap();
        assert!(q2.title.starts_with("[ARCHIVED] "));

        let resp = app
            .oneshot(authed_post(
                ROLLBACK,
                &token,
                Some(json!({ "rollbackData": rollback_data })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["message"], "Rollback completed");
        let summary = &json["data"]["summary"];
        assert_eq!(summary["quizzesDeleted"], 2);
        assert_eq!(summary["quizzesUnarchived"], 1);
        assert_eq!(summary["episodesAffected"], 2);
        assert_eq!(json["data"]["allEpisodesLinked"], false);

        for id in [seeded.e2, seeded.e3] {
            let episode = EpisodeModel::get_by_id(state.db(), id).await.unwrap().unwrap();
            assert_eq!(episode.quiz_id, None);
        }
        let q2 = QuizModel::get_by_id(state.db(), seeded.q2).await.unwrap().unwrap();
        assert_eq!(q2.title, "Avian influenza");
        assert_eq!(q2.description.as_deref(), Some("Biosecurity basics"));
        assert!(q2.is_active);
    }

    #[tokio::test]
    #[serial]
    async fn validation_issues_return_conflict_unless_forced() {
        let (app, state) = make_test_app().await;
        let seeded = seed_unmigrated(state.db()).await;
        CompletionModel::create(state.db(), seeded.q2, 5, 70).await.unwrap();
        let token = admin_token();

        let resp = app
            .clone()
            .oneshot(authed_post(MIGRATE, &token, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["data"]["errorKind"], "validation_blocked");
        let logs = json["data"]["logs"].as_array().unwrap();
        assert_eq!(logs.last().unwrap()["level"], "error");

        let resp = app
            .oneshot(authed_post(
                MIGRATE,
                &token,
                Some(json!({ "forceExecute": true })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["summary"]["archivedWithCompletions"], 1);
        assert_eq!(json["data"]["validation"]["passed"], false);
    }

    #[tokio::test]
    #[serial]
    async fn rollback_without_arrays_is_rejected_unless_forced() {
        let (app, state) = make_test_app().await;
        seed_unmigrated(state.db()).await;
        let token = admin_token();

        let resp = app
            .clone()
            .oneshot(authed_post(
                ROLLBACK,
                &token,
                Some(json!({ "rollbackData": { "createdQuizzes": [] } })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["errorKind"], "invalid_payload");
        assert!(
            json["message"]
                .as_str()
                .unwrap()
                .contains("archivedQuizzes, originalConstraints")
        );

        let resp = app
            .oneshot(authed_post(
                ROLLBACK,
                &token,
                Some(json!({ "rollbackData": { "createdQuizzes": [] }, "forceRollback": true })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    #[serial]
    async fn malformed_body_is_bad_request() {
        let (app, _state) = make_test_app().await;

        let req = Request::builder()
            .method("POST")
            .uri(MIGRATE)
            .header("Authorization", format!("Bearer {}", admin_token()))
            .header("Content-Type", "application/json")
            .body(AxumBody::from("{ not json"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json: Value = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert!(json["message"].as_str().unwrap().starts_with("Invalid request body"));
    }
}
