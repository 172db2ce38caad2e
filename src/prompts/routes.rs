use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates the AI prompts router
///
/// # Routes
/// - `GET /api/ai-prompt` - Generate a journaling prompt
/// - `POST /api/ai-prompt/custom` - Generate a prompt about a topic
pub fn prompts_routes() -> Router {
    Router::new()
        .route("/api/ai-prompt", get(handlers::get_prompt))
        .route("/api/ai-prompt/custom", post(handlers::custom_prompt))
}
