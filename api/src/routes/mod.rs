//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → Health check endpoint (public)
//! - `/admin/podcast-quiz` → Podcast/quiz relationship audit, migration and rollback (admin-only)

use crate::auth::guards::allow_admin;
use crate::routes::{admin::admin_routes, health::health_routes};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod admin;
pub mod health;

/// Builds the application router for all HTTP endpoints, with `app_state` applied.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/admin", admin_routes().route_layer(from_fn(allow_admin)))
        .with_state(app_state)
}
