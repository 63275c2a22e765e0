use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quiz_refactor::{audit, dashboard};
use util::state::AppState;

use crate::response::{ApiResponse, Empty};

/// GET /api/admin/podcast-quiz/audit
///
/// Read-only audit of the episode/quiz relationship.
///
/// ### Responses
/// - `200 OK` with `{ summary, details, recommendations }`
/// - `500 Internal Server Error` if any read fails (no partial report)
pub async fn get_audit(State(app_state): State<AppState>) -> Response {
    match audit::audit(app_state.db()).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                report.into_response(),
                "Audit completed",
            )),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Podcast-quiz audit failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Audit failed: {e}"))),
            )
                .into_response()
        }
    }
}

/// GET /api/admin/podcast-quiz/dashboard
///
/// Audit plus live constraint shape, with a derived `systemStatus`
/// (`healthy`, `readyForMigration`, `postMigrationState`), recommendations and
/// `nextAction`.
pub async fn get_dashboard(State(app_state): State<AppState>) -> Response {
    match dashboard::build(app_state.db()).await {
        Ok(dashboard) => (
            StatusCode::OK,
            Json(ApiResponse::success(dashboard, "Dashboard generated")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Podcast-quiz dashboard failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!(
                    "Failed to build dashboard: {e}"
                ))),
            )
                .into_response()
        }
    }
}
