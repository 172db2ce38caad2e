//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{request::Parts, Method},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::User;
use super::tokens::{TokenError, TokenKind, ACCESS_COOKIE, CSRF_COOKIE, CSRF_HEADER};
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Validates the access-token cookie, enforces the CSRF double-submit
/// check for state-changing methods, and loads the user row. The session
/// cookie rides on every request to the domain without client code, which
/// is exactly why the CSRF header echo is required.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

fn csrf_exempt(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Extension containing the AppState
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let jar = CookieJar::from_headers(&parts.headers);

        let access_token = match jar.get(ACCESS_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => {
                warn!("Authentication failed: missing access token cookie");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        let user_id = app_state
            .token_issuer
            .verify(&access_token, TokenKind::Access)
            .map_err(|e| match e {
                TokenError::Expired => ApiError::TokenExpired("access token expired".into()),
                TokenError::Invalid => ApiError::Unauthorized("invalid token".into()),
            })?;

        // Double-submit CSRF check for anything that can change state
        if !csrf_exempt(&parts.method) {
            let csrf_cookie = jar.get(CSRF_COOKIE).map(|c| c.value().to_string());
            let csrf_header = parts
                .headers
                .get(CSRF_HEADER)
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string());

            match (csrf_cookie, csrf_header) {
                (Some(cookie), Some(header)) if cookie == header => {}
                _ => {
                    warn!(
                        method = %parts.method,
                        uri = %parts.uri,
                        "CSRF token missing or mismatched"
                    );
                    return Err(ApiError::Forbidden("csrf token mismatch".into()));
                }
            }
        }

        // Look up user in database
        let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_optional(&app_state.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    user_id = %user_id,
                    "Database error during user lookup in authentication"
                );
                ApiError::DatabaseError(e)
            })?;

        match user {
            Some(u) => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser {
                    id: u.id,
                    username: u.username,
                    email: u.email,
                })
            }
            None => {
                warn!(user_id = %user_id, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized("user not found".into()))
            }
        }
    }
}
