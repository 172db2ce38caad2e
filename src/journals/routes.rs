use axum::{routing::get, Router};

use super::handlers;

/// Creates the journals router
///
/// # Routes
/// - `GET /api/journals` - List the caller's journals
/// - `POST /api/journals` - Create a journal
/// - `GET /api/journals/:id` - Fetch one journal
/// - `PATCH /api/journals/:id` - Update title/year/color
/// - `DELETE /api/journals/:id` - Delete a journal (cascades to entries)
pub fn journals_routes() -> Router {
    Router::new()
        .route(
            "/api/journals",
            get(handlers::list_journals).post(handlers::create_journal),
        )
        .route(
            "/api/journals/:id",
            get(handlers::get_journal)
                .patch(handlers::update_journal)
                .delete(handlers::delete_journal),
        )
}
