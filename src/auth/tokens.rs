//! Session token issuance and cookie transport.
//!
//! Access and refresh tokens are signed (not encrypted) HS256 JWTs with the
//! user id as subject. Both ride as HttpOnly cookies; a third, readable
//! `csrf_token` cookie implements the double-submit CSRF defense - state
//! changing requests must echo it in the `X-CSRF-Token` header.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use thiserror::Error;
use tracing::warn;

use super::models::Claims;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";
pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Refresh cookie is only sent to the refresh endpoint.
pub const REFRESH_COOKIE_PATH: &str = "/api/refresh-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    fn ttl(&self) -> Duration {
        match self {
            TokenKind::Access => Duration::hours(24),
            TokenKind::Refresh => Duration::days(30),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token was well-formed and correctly signed but past its expiry.
    /// The caller should refresh rather than re-authenticate.
    #[error("token expired")]
    Expired,

    /// Bad signature, bad structure, or wrong token kind.
    #[error("invalid token")]
    Invalid,
}

/// A freshly minted session: both JWTs plus the CSRF correlator.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub csrf_token: String,
}

/// Mints and validates session tokens for user ids.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: String,
}

impl TokenIssuer {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Mint an access + refresh pair (plus CSRF token) for a user id.
    pub fn issue_pair(&self, user_id: &str) -> Result<SessionTokens, jsonwebtoken::errors::Error> {
        Ok(SessionTokens {
            access_token: self.sign(user_id, TokenKind::Access)?,
            refresh_token: self.sign(user_id, TokenKind::Refresh)?,
            csrf_token: generate_secure_token(),
        })
    }

    /// Mint a single token of the given kind.
    pub fn sign(
        &self,
        user_id: &str,
        kind: TokenKind,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = (Utc::now() + kind.ttl()).timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            exp,
            kind: kind.as_str().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Validate a token of the expected kind and return its subject.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => {
                warn!(error = %e, "Session token validation failed");
                TokenError::Invalid
            }
        })?;

        if decoded.claims.kind != expected.as_str() {
            warn!(
                got = %decoded.claims.kind,
                expected = expected.as_str(),
                "Session token kind mismatch"
            );
            return Err(TokenError::Invalid);
        }

        Ok(decoded.claims.sub)
    }
}

/// 32 bytes of CSPRNG entropy, base64url-encoded. Used for CSRF tokens and
/// OAuth state values.
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Attach a freshly issued session to the response cookies.
pub fn with_session_cookies(jar: CookieJar, tokens: &SessionTokens, secure: bool) -> CookieJar {
    jar.add(
        Cookie::build((ACCESS_COOKIE, tokens.access_token.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .build(),
    )
    .add(
        Cookie::build((REFRESH_COOKIE, tokens.refresh_token.clone()))
            .path(REFRESH_COOKIE_PATH)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .build(),
    )
    .add(
        // Readable by frontend scripts: this is the half of the
        // double-submit pair the client must echo in X-CSRF-Token
        Cookie::build((CSRF_COOKIE, tokens.csrf_token.clone()))
            .path("/")
            .http_only(false)
            .same_site(SameSite::Lax)
            .secure(secure)
            .build(),
    )
}

/// Replace only the access + CSRF cookies after a refresh.
pub fn with_refreshed_access_cookie(
    jar: CookieJar,
    access_token: &str,
    csrf_token: &str,
    secure: bool,
) -> CookieJar {
    jar.add(
        Cookie::build((ACCESS_COOKIE, access_token.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .build(),
    )
    .add(
        Cookie::build((CSRF_COOKIE, csrf_token.to_string()))
            .path("/")
            .http_only(false)
            .same_site(SameSite::Lax)
            .secure(secure)
            .build(),
    )
}

/// Drop the whole session from the response cookies (logout / account
/// deletion). Revocation of provider-side tokens is the caller's concern.
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((ACCESS_COOKIE, "")).path("/").build())
        .remove(
            Cookie::build((REFRESH_COOKIE, ""))
                .path(REFRESH_COOKIE_PATH)
                .build(),
        )
        .remove(Cookie::build((CSRF_COOKIE, "")).path("/").build())
}
