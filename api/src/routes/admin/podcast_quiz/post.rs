use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quiz_refactor::migrate::{self, MigrationOptions};
use quiz_refactor::rollback::{self, RollbackRequest};
use serde::de::DeserializeOwned;
use util::state::AppState;

use super::failure_response;
use crate::response::{ApiResponse, Empty};

/// Parses an optional JSON body. An empty body means all defaults.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Empty>::error(format!("Invalid request body: {e}"))),
        )
            .into_response()
    })
}

/// POST /api/admin/podcast-quiz/audit
///
/// Same as `GET`; accepted for admin tools that only issue POSTs.
pub async fn post_audit(state: State<AppState>) -> Response {
    super::get::get_audit(state).await
}

/// POST /api/admin/podcast-quiz/migrate
///
/// ### Request Body
/// ```json
/// { "dryRun": true, "forceExecute": false }
/// ```
///
/// ### Responses
/// - `200 OK` with `{ success, dryRun, logs, summary, rollbackData, validation, postAudit }`
/// - `400 Bad Request` for a malformed body
/// - `409 Conflict` when validation reports issues and `forceExecute` is not set
/// - `422 Unprocessable Entity` when the quiz link cannot be enforced
/// - `500 Internal Server Error` on a database failure mid-run (nothing is kept)
///
/// Failures carry `{ success: false, errorKind, error, logs }` in `data`.
pub async fn migrate(State(app_state): State<AppState>, body: Bytes) -> Response {
    let options: MigrationOptions = match parse_body(&body) {
        Ok(options) => options,
        Err(response) => return response,
    };

    match migrate::run(app_state.db(), options).await {
        Ok(report) => {
            let message = if report.dry_run {
                "Dry run completed; no changes were kept"
            } else {
                "Migration completed"
            };
            (StatusCode::OK, Json(ApiResponse::success(report, message))).into_response()
        }
        Err(failure) => failure_response(failure),
    }
}

/// POST /api/admin/podcast-quiz/rollback
///
/// ### Request Body
/// ```json
/// {
///   "rollbackData": { "createdQuizzes": [4, 5], "archivedQuizzes": [2], "originalConstraints": [] },
///   "dryRun": false,
///   "forceRollback": false
/// }
/// ```
///
/// ### Responses
/// - `200 OK` with `{ success, dryRun, logs, summary, allEpisodesLinked, postAudit }`
/// - `400 Bad Request` for a malformed body or rollback data missing an array without `forceRollback`
/// - `500 Internal Server Error` on a database failure mid-run (nothing is kept)
pub async fn rollback(State(app_state): State<AppState>, body: Bytes) -> Response {
    let request: RollbackRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match rollback::run(app_state.db(), request).await {
        Ok(report) => {
            let message = if report.dry_run {
                "Dry run completed; no changes were kept"
            } else {
                "Rollback completed"
            };
            (StatusCode::OK, Json(ApiResponse::success(report, message))).into_response()
        }
        Err(failure) => failure_response(failure),
    }
}
