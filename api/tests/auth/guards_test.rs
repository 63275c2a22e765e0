#[cfg(test)]
mod tests {
    use axum::{
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use serial_test::serial;
    use tower::ServiceExt;

    use crate::helpers::app::{
        admin_token, authed_get, authed_post, body_json, listener_token, make_test_app,
    };

    const ADMIN_ROUTES: [(&str, &str); 5] = [
        ("GET", "/api/admin/podcast-quiz/audit"),
        ("POST", "/api/admin/podcast-quiz/audit"),
        ("POST", "/api/admin/podcast-quiz/migrate"),
        ("POST", "/api/admin/podcast-quiz/rollback"),
        ("GET", "/api/admin/podcast-quiz/dashboard"),
    ];

    #[tokio::test]
    #[serial]
    async fn admin_routes_require_a_token() {
        let (app, _state) = make_test_app().await;

        for (method, uri) in ADMIN_ROUTES {
            let req = Request::builder()
                .method(method)
                .uri(uri)
                .body(AxumBody::empty())
                .unwrap();

            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");

            let json = body_json(resp).await;
            assert_eq!(json["success"], false);
            assert_eq!(json["message"], "Authentication required");
        }
    }

    #[tokio::test]
    #[serial]
    async fn admin_routes_reject_non_admins() {
        let (app, _state) = make_test_app().await;
        let token = listener_token();

        for (method, uri) in ADMIN_ROUTES {
            let req = if method == "GET" {
                authed_get(uri, &token)
            } else {
                authed_post(uri, &token, None)
            };

            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{method} {uri}");
        }
    }

    #[tokio::test]
    #[serial]
    async fn admin_token_is_accepted() {
        let (app, _state) = make_test_app().await;

        let resp = app
            .oneshot(authed_get(
                "/api/admin/podcast-quiz/dashboard",
                &admin_token(),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
