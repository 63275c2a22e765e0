use axum::Router;
use util::state::AppState;

pub mod podcast_quiz;

/// Builds the `/admin` route group. The caller applies the admin guard.
pub fn admin_routes() -> Router<AppState> {
    Router::new().nest("/podcast-quiz", podcast_quiz::podcast_quiz_routes())
}
