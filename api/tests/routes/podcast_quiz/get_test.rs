#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serial_test::serial;
    use tower::ServiceExt;

    use crate::helpers::app::{
        admin_token, authed_get, authed_post, body_json, make_test_app, seed_unmigrated,
    };

    #[tokio::test]
    #[serial]
    async fn audit_reports_gaps() {
        let (app, state) = make_test_app().await;
        let seeded = seed_unmigrated(state.db()).await;

        let resp = app
            .oneshot(authed_get("/api/admin/podcast-quiz/audit", &admin_token()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        let data = &json["data"];
        assert_eq!(data["summary"]["totalEpisodes"], 3);
        assert_eq!(data["summary"]["episodesWithoutQuizzes"], 2);
        assert_eq!(data["summary"]["orphanedQuizzes"], 1);
        assert_eq!(data["summary"]["isClean"], false);
        assert_eq!(data["details"]["episodesWithoutQuizzes"][0]["id"], seeded.e2);
        assert_eq!(data["details"]["orphanedQuizzes"][0]["id"], seeded.q2);
        assert_eq!(data["details"]["orphanedQuizzes"][0]["completionCount"], 0);
        assert!(!data["recommendations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn audit_accepts_post() {
        let (app, state) = make_test_app().await;
        seed_unmigrated(state.db()).await;

        let resp = app
            .oneshot(authed_post("/api/admin/podcast-quiz/audit", &admin_token(), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["data"]["summary"]["episodesWithoutQuizzes"], 2);
    }

    #[tokio::test]
    #[serial]
    async fn dashboard_before_and_after_migration() {
        let (app, state) = make_test_app().await;
        seed_unmigrated(state.db()).await;
        let token = admin_token();

        let resp = app
            .clone()
            .oneshot(authed_get("/api/admin/podcast-quiz/dashboard", &token))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["systemStatus"], "readyForMigration");
        assert_eq!(json["data"]["quizLink"]["nullable"], true);
        assert!(json["data"]["recommendations"]["blockers"].as_array().unwrap().is_empty());

        let resp = app
            .clone()
            .oneshot(authed_post("/api/admin/podcast-quiz/migrate", &token, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(authed_get("/api/admin/podcast-quiz/dashboard", &token))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["data"]["systemStatus"], "healthy");
        assert_eq!(json["data"]["nextAction"], "No action required");
        assert_eq!(json["data"]["quizLink"]["nullable"], false);
        assert_eq!(
            json["data"]["quizLink"]["constraints"][0]["onDelete"],
            "CASCADE"
        );
    }
}
