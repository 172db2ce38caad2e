use axum::{routing::get, Router};

use super::handlers;

/// Creates the moods router
///
/// # Routes
/// - `GET /api/moods` - List the mood reference set
pub fn moods_routes() -> Router {
    Router::new().route("/api/moods", get(handlers::list_moods))
}
