//! Authentication handlers: signup, login, logout, session refresh,
//! profile and account deletion.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{LoginRequest, MessageResponse, PublicUser, SignupRequest, User};
use super::tokens::{
    clear_session_cookies, generate_secure_token, with_refreshed_access_cookie,
    with_session_cookies, TokenError, TokenKind, REFRESH_COOKIE,
};
use super::validators;
use crate::common::error::map_unique_violation;
use crate::common::{generate_user_id, safe_email_log, ApiError, AppState};

/// One message for unknown usernames and wrong passwords, so login
/// failures can't be used to enumerate accounts.
const INVALID_CREDENTIALS: &str = "invalid username or password";

pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Password hashing failed");
            ApiError::InternalServer("password hashing failed".to_string())
        })
}

pub(crate) fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

async fn fetch_user(db: &sqlx::SqlitePool, user_id: &str) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::Unauthorized("user not found".to_string()))
}

/// POST /api/signup
/// Registers a password account and opens a session
///
/// # Request Body
/// ```json
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "Passw0rd!"
/// }
/// ```
pub async fn signup(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = validators::validate_signup(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    // Field-specific duplicate checks first; the unique constraints still
    // backstop a concurrent insert racing past these
    let username_taken: Option<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(&payload.username)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;
    if username_taken.is_some() {
        return Err(ApiError::DuplicateField("Username is already in use".to_string()));
    }

    let email_taken: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&payload.email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;
    if email_taken.is_some() {
        return Err(ApiError::DuplicateField("Email is already in use".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user_id = generate_user_id();

    sqlx::query("INSERT INTO users (id, username, email, password_hash) VALUES (?, ?, ?, ?)")
        .bind(&user_id)
        .bind(&payload.username)
        .bind(&payload.email)
        .bind(&password_hash)
        .execute(&state.db)
        .await
        .map_err(|e| map_unique_violation(e, "Username or email is already in use"))?;

    let user = fetch_user(&state.db, &user_id).await?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "New user account created via signup"
    );

    let tokens = state.token_issuer.issue_pair(&user.id).map_err(|e| {
        error!(error = %e, user_id = %user.id, "JWT encoding error during signup");
        ApiError::InternalServer("jwt error".to_string())
    })?;
    let jar = with_session_cookies(jar, &tokens, state.cookie_secure);

    Ok((StatusCode::CREATED, jar, Json(PublicUser::from(&user))))
}

/// POST /api/login
/// Authenticates a password account and opens a session
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(&payload.username)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let user = match user {
        Some(u) => u,
        None => {
            warn!(username = %payload.username, "Login failed: unknown username");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    // OAuth-only accounts have no password hash and cannot log in here
    let stored_hash = match user.password_hash.as_deref() {
        Some(h) => h,
        None => {
            warn!(user_id = %user.id, "Login failed: account has no password");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    if !verify_password(&payload.password, stored_hash) {
        warn!(user_id = %user.id, "Login failed: incorrect password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let tokens = state.token_issuer.issue_pair(&user.id).map_err(|e| {
        error!(error = %e, user_id = %user.id, "JWT encoding error during login");
        ApiError::InternalServer("jwt error".to_string())
    })?;
    let jar = with_session_cookies(jar, &tokens, state.cookie_secure);

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "🔐 User login successful"
    );

    Ok((jar, Json(PublicUser::from(&user))))
}

/// DELETE /api/logout
/// Clears the session cookies and revokes any stored Google token
/// best-effort in the background
pub async fn logout(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
    authed: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT google_access_token FROM users WHERE id = ?")
            .bind(&authed.id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    if let Some((Some(google_token),)) = row {
        let google = state.google_service.clone();
        let user_id = authed.id.clone();
        // Provider revocation must never delay or fail local logout
        tokio::spawn(async move {
            if let Err(e) = google.revoke_token(&google_token).await {
                warn!(error = %e, user_id = %user_id, "Best-effort Google token revocation failed");
            }
        });
    }

    info!(user_id = %authed.id, "User logout successful");

    Ok((StatusCode::NO_CONTENT, clear_session_cookies(jar)))
}

/// POST /api/refresh-token
/// Mints a new access token from the refresh cookie. Also proactively
/// refreshes the user's Google access token when it is about to expire,
/// so provider calls don't fail independently of our own session.
pub async fn refresh_token(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let refresh = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("missing refresh token".to_string()))?;

    let user_id = state
        .token_issuer
        .verify(&refresh, TokenKind::Refresh)
        .map_err(|e| match e {
            // An expired refresh token means a full re-login
            TokenError::Expired => ApiError::Unauthorized("refresh token expired".to_string()),
            TokenError::Invalid => ApiError::Unauthorized("invalid refresh token".to_string()),
        })?;

    let user = fetch_user(&state.db, &user_id).await?;

    let access_token = state
        .token_issuer
        .sign(&user.id, TokenKind::Access)
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "JWT encoding error during refresh");
            ApiError::InternalServer("jwt error".to_string())
        })?;
    let csrf_token = generate_secure_token();

    maybe_refresh_google_tokens(&state, &user).await;

    let jar = with_refreshed_access_cookie(jar, &access_token, &csrf_token, state.cookie_secure);

    info!(user_id = %user.id, "Access token refreshed");

    Ok((
        jar,
        Json(MessageResponse {
            message: "token refreshed".to_string(),
        }),
    ))
}

/// Refresh the stored Google access token if it expires within five
/// minutes and a refresh token is on file. Best-effort: failures are
/// logged and the session refresh proceeds regardless.
async fn maybe_refresh_google_tokens(state: &AppState, user: &User) {
    let refresh_token = match user.google_refresh_token.as_deref() {
        Some(t) => t,
        None => return,
    };

    let expires_soon = user
        .google_token_expires_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc) <= Utc::now() + Duration::minutes(5))
        .unwrap_or(true);

    if !expires_soon {
        return;
    }

    match state.google_service.refresh_access_token(refresh_token).await {
        Ok(tokens) => {
            let expires_at = (Utc::now() + Duration::seconds(tokens.expires_in)).to_rfc3339();
            let result = sqlx::query(
                "UPDATE users SET google_access_token = ?, google_token_expires_at = ?, \
                 google_refresh_token = COALESCE(?, google_refresh_token) WHERE id = ?",
            )
            .bind(&tokens.access_token)
            .bind(&expires_at)
            .bind(&tokens.refresh_token)
            .bind(&user.id)
            .execute(&state.db)
            .await;

            match result {
                Ok(_) => info!(user_id = %user.id, "Proactively refreshed Google access token"),
                Err(e) => {
                    warn!(error = %e, user_id = %user.id, "Failed to persist refreshed Google token")
                }
            }
        }
        Err(e) => {
            warn!(error = %e, user_id = %user.id, "Best-effort Google token refresh failed");
        }
    }
}

/// GET /api/user/profile
/// Returns the current authenticated user's information
pub async fn user_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<PublicUser>, ApiError> {
    let state = state_lock.read().await.clone();
    let user = fetch_user(&state.db, &authed.id).await?;
    Ok(Json(PublicUser::from(&user)))
}

/// DELETE /api/user/delete
/// Deletes the account and everything it owns (journals, entries and mood
/// associations go with it via cascade), then drops the session
pub async fn delete_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
    authed: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let user = fetch_user(&state.db, &authed.id).await?;
    if let Some(google_token) = user.google_access_token.clone() {
        let google = state.google_service.clone();
        let user_id = user.id.clone();
        tokio::spawn(async move {
            if let Err(e) = google.revoke_token(&google_token).await {
                warn!(error = %e, user_id = %user_id, "Best-effort Google token revocation failed");
            }
        });
    }

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(user_id = %authed.id, "User account deleted");

    Ok((StatusCode::NO_CONTENT, clear_session_cookies(jar)))
}
