use axum::{routing::get, Router};

use super::handlers;

/// Creates the stats router
///
/// # Routes
/// - `GET /api/user/stats` - Activity statistics for the caller
pub fn stats_routes() -> Router {
    Router::new().route("/api/user/stats", get(handlers::user_stats))
}
