#[cfg(test)]
mod tests {
    use api::auth::claims::{AuthUser, Claims};
    use axum::{extract::FromRequestParts, http::Request, http::StatusCode};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serial_test::serial;
    use std::time::{SystemTime, UNIX_EPOCH};
    use util::config::AppConfig;

    use crate::helpers::app::TEST_JWT_SECRET;

    fn generate_token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap()
    }

    fn now() -> usize {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize
    }

    async fn extract(token: &str) -> Result<AuthUser, (StatusCode, &'static str)> {
        let request = Request::builder()
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    #[serial]
    async fn test_valid_token() {
        AppConfig::set_jwt_secret(TEST_JWT_SECRET);
        let claims = Claims {
            sub: 1,
            exp: now() + 3600,
            admin: true,
        };

        let auth_user = extract(&generate_token(&claims, TEST_JWT_SECRET))
            .await
            .unwrap();

        assert_eq!(auth_user.0.sub, 1);
        assert!(auth_user.0.admin);
    }

    #[tokio::test]
    #[serial]
    async fn test_invalid_token_wrong_secret() {
        AppConfig::set_jwt_secret(TEST_JWT_SECRET);
        let claims = Claims {
            sub: 1,
            exp: now() + 3600,
            admin: false,
        };

        let (status, message) = extract(&generate_token(&claims, "wrong_secret"))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Invalid or expired token");
    }

    #[tokio::test]
    #[serial]
    async fn test_expired_token() {
        AppConfig::set_jwt_secret(TEST_JWT_SECRET);
        let claims = Claims {
            sub: 1,
            exp: now() - 3600,
            admin: true,
        };

        let (status, _) = extract(&generate_token(&claims, TEST_JWT_SECRET))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_header() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let (status, message) = AuthUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Missing or invalid Authorization header");
    }
}
