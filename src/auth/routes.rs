//! Authentication routes

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::{handlers, oauth};

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/signup` - Password registration
/// - `POST /api/login` - Password login
/// - `DELETE /api/logout` - Clear the session
/// - `POST /api/refresh-token` - Mint a new access token
/// - `GET /api/login/google` - Start the Google OAuth flow
/// - `GET /api/authorize` - Google OAuth callback
/// - `GET /api/user/profile` - Current user information
/// - `DELETE /api/user/delete` - Delete the account
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/signup", post(handlers::signup))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", delete(handlers::logout))
        .route("/api/refresh-token", post(handlers::refresh_token))
        .route("/api/login/google", get(oauth::google_login))
        .route("/api/authorize", get(oauth::google_authorize))
        .route("/api/user/profile", get(handlers::user_profile))
        .route("/api/user/delete", delete(handlers::delete_user))
}
