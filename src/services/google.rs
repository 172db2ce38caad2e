// src/services/google.rs
//! Google OAuth provider client: authorization URL construction, code
//! exchange, userinfo fetch, token refresh and revocation. All calls are
//! server-to-server with bounded timeouts; nothing here touches the
//! database - callers persist tokens on the user row themselves.

use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const REVOKE_ENDPOINT: &str = "https://oauth2.googleapis.com/revoke";

/// External provider calls must never hang a request handler.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("identity fetch failed: {0}")]
    IdentityFetchFailed(String),

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// OAuth client credentials plus the registered callback URL.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Token material returned by the provider's token endpoint.
/// `refresh_token` is only present on first consent.
#[derive(Debug, Deserialize)]
pub struct GoogleTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Subset of the userinfo payload we care about.
#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleService {
    config: Option<GoogleConfig>,
    client: Client,
}

impl GoogleService {
    pub fn new(config: Option<GoogleConfig>) -> Self {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Build the service from `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` /
    /// `GOOGLE_OAUTH_REDIRECT_URI`. Missing credentials leave the service
    /// unconfigured; OAuth endpoints then fail with `NotConfigured`.
    pub fn from_env() -> Self {
        let client_id = env::var("GOOGLE_CLIENT_ID").ok();
        let client_secret = env::var("GOOGLE_CLIENT_SECRET").ok();
        let redirect_uri = env::var("GOOGLE_OAUTH_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:5555/api/authorize".to_string());

        let config = match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Some(GoogleConfig {
                client_id,
                client_secret,
                redirect_uri,
            }),
            _ => {
                warn!("Google OAuth credentials not set; Google login is disabled");
                None
            }
        };

        Self::new(config)
    }

    fn config(&self) -> Result<&GoogleConfig, GoogleError> {
        self.config.as_ref().ok_or(GoogleError::NotConfigured)
    }

    /// Build the authorization redirect URL for a login attempt.
    ///
    /// `access_type=offline` asks for a refresh token so downstream calls
    /// can outlive the first access token; `state` is the anti-CSRF
    /// correlator persisted by the caller.
    pub fn authorization_url(&self, state: &str) -> Result<String, GoogleError> {
        let config = self.config()?;
        let scope = "openid email profile";

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            AUTHORIZATION_ENDPOINT,
            urlencoding::encode(&config.client_id),
            urlencoding::encode(&config.redirect_uri),
            urlencoding::encode(scope),
            urlencoding::encode(state),
        );

        debug!(scope = scope, "Generated Google OAuth authorization URL");
        Ok(url)
    }

    /// Exchange an authorization code for access/refresh tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokens, GoogleError> {
        let config = self.config()?;

        let params = [
            ("code", code),
            ("client_id", &config.client_id),
            ("client_secret", &config.client_secret),
            ("redirect_uri", &config.redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            return Err(GoogleError::ExchangeFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let tokens = response
            .json::<GoogleTokens>()
            .await
            .map_err(|e| GoogleError::MalformedResponse(e.to_string()))?;

        info!(
            has_refresh_token = tokens.refresh_token.is_some(),
            "Successfully exchanged authorization code for tokens"
        );
        Ok(tokens)
    }

    /// Fetch the authenticated user's identity from the userinfo endpoint.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<GoogleUserInfo, GoogleError> {
        let response = self
            .client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Userinfo fetch failed");
            return Err(GoogleError::IdentityFetchFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| GoogleError::MalformedResponse(e.to_string()))
    }

    /// Refresh an expiring provider access token with a stored refresh token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<GoogleTokens, GoogleError> {
        let config = self.config()?;

        let params = [
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        debug!("Refreshing Google access token");

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Google token refresh failed");
            return Err(GoogleError::RefreshFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let tokens = response
            .json::<GoogleTokens>()
            .await
            .map_err(|e| GoogleError::MalformedResponse(e.to_string()))?;

        info!("Successfully refreshed Google access token");
        Ok(tokens)
    }

    /// Revoke a provider token. Best-effort: logout flows log failures and
    /// proceed, they never block on the provider.
    pub async fn revoke_token(&self, token: &str) -> Result<(), GoogleError> {
        // Revocation works without client credentials, so don't require config
        let response = self
            .client
            .post(REVOKE_ENDPOINT)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, error = %error_text, "Google token revocation failed");
            return Err(GoogleError::RequestFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        info!("Revoked Google token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured_service() -> GoogleService {
        GoogleService::new(Some(GoogleConfig {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            redirect_uri: "http://localhost:5555/api/authorize".to_string(),
        }))
    }

    #[test]
    fn test_authorization_url_contains_required_params() {
        let service = configured_service();
        let url = service.authorization_url("state-token-value").unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("redirect_uri=http"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("state=state-token-value"));
    }

    #[test]
    fn test_unconfigured_service_rejects_authorization() {
        let service = GoogleService::new(None);
        let result = service.authorization_url("state");
        assert!(matches!(result.unwrap_err(), GoogleError::NotConfigured));
    }

    #[tokio::test]
    async fn test_unconfigured_service_rejects_exchange() {
        let service = GoogleService::new(None);
        let result = service.exchange_code("some-code").await;
        assert!(matches!(result.unwrap_err(), GoogleError::NotConfigured));
    }
}
