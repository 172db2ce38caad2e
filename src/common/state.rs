// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::tokens::TokenIssuer;
use crate::services::{GoogleService, PromptGenService};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub frontend_url: String,
    pub cookie_secure: bool,
    pub token_issuer: Arc<TokenIssuer>,
    pub google_service: Arc<GoogleService>,
    pub prompt_service: Arc<PromptGenService>,
}
