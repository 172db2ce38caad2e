use axum::{routing::get, Router};

use super::handlers;

/// Creates the entries router
///
/// # Routes
/// - `GET /api/entries` - All entries across the caller's journals
/// - `POST /api/entries` - Create an entry
/// - `GET /api/entries/:id` - Fetch one entry with moods
/// - `PATCH /api/entries/:id` - Partial update (moods replaceable)
/// - `DELETE /api/entries/:id` - Delete an entry
/// - `GET /api/journals/:id/entries` - Entries of one journal
pub fn entries_routes() -> Router {
    Router::new()
        .route(
            "/api/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(
            "/api/entries/:id",
            get(handlers::get_entry)
                .patch(handlers::update_entry)
                .delete(handlers::delete_entry),
        )
        .route(
            "/api/journals/:id/entries",
            get(handlers::list_journal_entries),
        )
}
