// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod entries;
mod journals;
mod logging_middleware;
mod moods;
mod prompts;
mod services;
mod stats;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::tokens::TokenIssuer;
use common::AppState;
use services::{GoogleService, PromptGenService};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://journal_api.db".to_string());
    let jwt_secret = match env::var("JWT_SECRET") {
        Ok(secret) => secret,
        Err(_) => {
            warn!("JWT_SECRET not set, using an insecure development default");
            "replace_with_strong_secret".to_string()
        }
    };
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
    let cookie_secure = env::var("COOKIE_SECURE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let connect_options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        // Cascade deletes (user -> journals -> entries) rely on this
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;
    common::migrations::seed_moods_if_empty(&pool).await?;
    common::migrations::cleanup_oauth_states(&pool).await;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let token_issuer = Arc::new(TokenIssuer::new(jwt_secret));
    info!("TokenIssuer initialized");

    let google_service = Arc::new(GoogleService::from_env());
    info!("GoogleService initialized");

    let prompt_service = Arc::new(PromptGenService::from_env());
    info!("PromptGenService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        frontend_url: frontend_url.clone(),
        cookie_secure,
        token_issuer,
        google_service,
        prompt_service,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        // ====================================================================
        // AUTHENTICATION AND SESSION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // JOURNAL ROUTES
        // ====================================================================
        .merge(journals::journals_routes())
        // ====================================================================
        // ENTRY ROUTES (including per-journal listing)
        // ====================================================================
        .merge(entries::entries_routes())
        // ====================================================================
        // MOOD REFERENCE ROUTES
        // ====================================================================
        .merge(moods::moods_routes())
        // ====================================================================
        // ACTIVITY STATISTICS ROUTES
        // ====================================================================
        .merge(stats::stats_routes())
        // ====================================================================
        // AI PROMPT ROUTES
        // ====================================================================
        .merge(prompts::prompts_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared.clone()))
        .layer({
            // Session cookies ride on cross-origin requests from the
            // frontend, so credentials must be allowed and origins explicit
            let cors_origins =
                env::var("CORS_ORIGINS").unwrap_or_else(|_| frontend_url.clone());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::HeaderName::from_static("x-csrf-token"),
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5555);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
