//! `/admin/podcast-quiz` routes.
//!
//! - `GET|POST /audit` → relationship audit
//! - `POST /migrate` → forward migration (`{dryRun?, forceExecute?}`)
//! - `POST /rollback` → rollback (`{rollbackData, dryRun?, forceRollback?}`)
//! - `GET /dashboard` → status summary with next action

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use quiz_refactor::{RefactorError, RunFailure, error::FailureReport};
use util::state::AppState;

use crate::response::ApiResponse;

pub mod get;
pub mod post;

pub fn podcast_quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/audit", get(get::get_audit).post(post::post_audit))
        .route("/migrate", post(post::migrate))
        .route("/rollback", post(post::rollback))
        .route("/dashboard", get(get::get_dashboard))
}

fn failure_status(error: &RefactorError) -> StatusCode {
    match error {
        RefactorError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        RefactorError::ValidationBlocked(_) => StatusCode::CONFLICT,
        RefactorError::ConstraintCheck { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RefactorError::PostCheck(_) | RefactorError::Schema(_) | RefactorError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Maps a failed run to its status code, keeping the collected logs in `data`.
pub(crate) fn failure_response(failure: RunFailure) -> Response {
    let status = failure_status(&failure.error);
    if status.is_server_error() {
        tracing::error!(kind = failure.error.kind(), error = %failure.error, "Run failed");
    } else {
        tracing::warn!(kind = failure.error.kind(), error = %failure.error, "Run rejected");
    }

    let message = failure.error.to_string();
    (
        status,
        Json(ApiResponse::failure(FailureReport::from(&failure), message)),
    )
        .into_response()
}
