//! Google OAuth handshake: login initiation and the authorization
//! callback. Every callback failure is surfaced to the user as a redirect
//! to the frontend with an encoded error message - never a raw error page.

use axum::extract::{Extension, Query};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::User;
use super::tokens::{generate_secure_token, with_session_cookies};
use super::validators::sanitize_username;
use crate::common::{
    generate_oauth_state_id, generate_raw_id, generate_user_id, safe_email_log, ApiError, AppState,
};
use crate::services::google::{GoogleTokens, GoogleUserInfo};

/// Server-side state records expire shortly after the redirect is issued.
const STATE_TTL_MINUTES: i64 = 10;

/// Stored with second precision so SQLite's `datetime('now')` compares
/// lexicographically against it.
const STATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn frontend_error_redirect(frontend_url: &str, message: &str) -> Redirect {
    let url = format!(
        "{}/oauth/callback?error={}",
        frontend_url,
        urlencoding::encode(message)
    );
    Redirect::to(&url)
}

/// GET /api/login/google - Start the Google OAuth flow
///
/// Persists a single-use anti-CSRF state record and redirects the user
/// agent to Google's authorization endpoint.
pub async fn google_login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let state_token = generate_secure_token();
    let expires_at = (Utc::now() + Duration::minutes(STATE_TTL_MINUTES))
        .format(STATE_TIME_FORMAT)
        .to_string();

    sqlx::query("INSERT INTO oauth_states (id, state, expires_at) VALUES (?, ?, ?)")
        .bind(generate_oauth_state_id())
        .bind(&state_token)
        .bind(&expires_at)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let auth_url = state
        .google_service
        .authorization_url(&state_token)
        .map_err(|e| {
            error!(error = %e, "Failed to build Google authorization URL");
            ApiError::ServiceUnavailable("google login is not available".to_string())
        })?;

    info!("Starting Google OAuth flow");
    Ok(Redirect::to(&auth_url))
}

/// GET /api/authorize - Handle the OAuth callback from Google
///
/// Validates the anti-CSRF state before any provider contact, exchanges
/// the authorization code, fetches the identity, upserts the user and
/// opens a session. All failure paths redirect to the frontend.
pub async fn google_authorize(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = state_lock.read().await.clone();
    let frontend = state.frontend_url.clone();

    // Provider-side denial (user clicked cancel, consent revoked, ...)
    if let Some(provider_error) = params.get("error") {
        warn!(oauth_error = %provider_error, "Google OAuth returned an error");
        return frontend_error_redirect(&frontend, "google sign-in was denied").into_response();
    }

    // State must match a stored, unused, unexpired record before we talk
    // to the provider at all
    let state_param = match params.get("state") {
        Some(s) if !s.is_empty() => s,
        _ => {
            warn!("OAuth callback missing state parameter");
            return frontend_error_redirect(&frontend, "sign-in session was invalid").into_response();
        }
    };

    match consume_state(&state.db, state_param).await {
        Ok(true) => {}
        Ok(false) => {
            warn!("OAuth callback state mismatch, expired, or already used");
            return frontend_error_redirect(&frontend, "sign-in session was invalid or expired")
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error validating OAuth state");
            return frontend_error_redirect(&frontend, "sign-in failed, please try again")
                .into_response();
        }
    }

    let code = match params.get("code") {
        Some(c) if !c.is_empty() => c,
        _ => {
            warn!("OAuth callback missing authorization code");
            return frontend_error_redirect(&frontend, "no authorization code provided")
                .into_response();
        }
    };

    let tokens = match state.google_service.exchange_code(code).await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Authorization code exchange failed");
            return frontend_error_redirect(&frontend, "could not complete google sign-in")
                .into_response();
        }
    };

    let userinfo = match state.google_service.fetch_userinfo(&tokens.access_token).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Userinfo fetch failed");
            return frontend_error_redirect(&frontend, "could not read google profile")
                .into_response();
        }
    };

    let user = match upsert_google_user(&state.db, &userinfo, &tokens).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to upsert Google user");
            return frontend_error_redirect(&frontend, "sign-in failed, please try again")
                .into_response();
        }
    };

    let session = match state.token_issuer.issue_pair(&user.id) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "JWT encoding error during OAuth login");
            return frontend_error_redirect(&frontend, "sign-in failed, please try again")
                .into_response();
        }
    };

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "🔐 User authentication successful via Google OAuth"
    );

    let jar = with_session_cookies(jar, &session, state.cookie_secure);
    let completion_url = format!("{}/oauth/callback", frontend);
    (jar, Redirect::to(&completion_url)).into_response()
}

/// Mark a state record used, but only if it is currently unused and
/// unexpired. The conditional update makes single-use atomic under
/// concurrent callback delivery.
pub async fn consume_state(db: &SqlitePool, state: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE oauth_states SET used = 1 \
         WHERE state = ? AND used = 0 AND expires_at > datetime('now')",
    )
    .bind(state)
    .execute(db)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Look the user up by email and either attach the Google identity to the
/// existing account or create a fresh one with a derived username.
/// An absent refresh token never overwrites a stored one - Google only
/// returns it on first consent.
pub async fn upsert_google_user(
    db: &SqlitePool,
    userinfo: &GoogleUserInfo,
    tokens: &GoogleTokens,
) -> Result<User, sqlx::Error> {
    let token_expires_at = (Utc::now() + Duration::seconds(tokens.expires_in)).to_rfc3339();

    let existing: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&userinfo.email)
        .fetch_optional(db)
        .await?;

    let user_id = match existing {
        Some(user) => {
            sqlx::query(
                "UPDATE users SET google_id = ?, google_access_token = ?, \
                 google_token_expires_at = ?, \
                 google_refresh_token = COALESCE(?, google_refresh_token) WHERE id = ?",
            )
            .bind(&userinfo.id)
            .bind(&tokens.access_token)
            .bind(&token_expires_at)
            .bind(&tokens.refresh_token)
            .bind(&user.id)
            .execute(db)
            .await?;
            user.id
        }
        None => {
            let display_name = userinfo
                .name
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| userinfo.email.split('@').next().unwrap_or("writer"));
            let base = sanitize_username(display_name);
            let username = unique_username(db, &base).await?;

            let id = generate_user_id();
            sqlx::query(
                "INSERT INTO users (id, username, email, google_id, google_access_token, \
                 google_refresh_token, google_token_expires_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(&username)
            .bind(&userinfo.email)
            .bind(&userinfo.id)
            .bind(&tokens.access_token)
            .bind(&tokens.refresh_token)
            .bind(&token_expires_at)
            .execute(db)
            .await?;

            info!(
                user_id = %id,
                email = %safe_email_log(&userinfo.email),
                "Created new user account via Google OAuth"
            );
            id
        }
    };

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_one(db)
        .await
}

/// Append an incrementing numeric suffix until the candidate is free,
/// trimming the base so the result stays within the username limit.
/// Sanitized bases are ASCII, so byte slicing is safe here.
pub async fn unique_username(db: &SqlitePool, base: &str) -> Result<String, sqlx::Error> {
    let mut candidate = base.to_string();

    for suffix in 1u32..100 {
        let taken: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(&candidate)
            .fetch_optional(db)
            .await?;
        if taken.is_none() {
            return Ok(candidate);
        }

        let suffix_str = suffix.to_string();
        let keep = base.len().min(20 - suffix_str.len());
        candidate = format!("{}{}", &base[..keep], suffix_str);
    }

    // Pathological collision rate: fall back to a random tail
    let tail = generate_raw_id(6);
    let keep = base.len().min(20 - tail.len());
    Ok(format!("{}{}", &base[..keep], tail))
}
