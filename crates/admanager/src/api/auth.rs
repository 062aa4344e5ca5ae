//! Access tokens for the Ad Manager API
//!
//! Two providers are available:
//! - [`StaticToken`] for a token minted elsewhere (e.g. `gcloud auth print-access-token`)
//! - [`RefreshTokenAuth`] for the OAuth2 refresh-token grant, cached in memory
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Mutex;

/// Source of bearer tokens for API requests
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token, refreshing as needed
    fn access_token(&self) -> Result<String>;
}

/// A fixed, caller-supplied access token
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl AccessTokenProvider for StaticToken {
    fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Access token held in memory with its expiry (unix seconds)
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<i64>,
}

impl CachedToken {
    /// Valid if it does not expire within the refresh margin
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at > now + RefreshTokenAuth::EXPIRY_MARGIN_SECS)
    }
}

/// OAuth2 refresh-token grant for the Ad Manager scope
pub struct RefreshTokenAuth {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl RefreshTokenAuth {
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Tokens expiring within this window are refreshed early
    const EXPIRY_MARGIN_SECS: i64 = 300;

    /// Create a provider from installed-app credentials and a refresh token
    pub fn new(client_id: String, client_secret: String, refresh_token: String) -> Self {
        Self {
            client_id,
            client_secret,
            refresh_token,
            token_url: Self::TOKEN_URL.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Point the provider at a different token endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Exchange the refresh token for a new access token
    fn refresh(&self) -> Result<TokenResponse> {
        let mut response = ureq::post(&self.token_url)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse refresh token response")
    }
}

impl AccessTokenProvider for RefreshTokenAuth {
    fn access_token(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| anyhow::anyhow!("Access token cache poisoned"))?;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.access_token.clone());
        }

        log::debug!("Refreshing Ad Manager access token");
        let response = self.refresh()?;
        let token = CachedToken {
            access_token: response.access_token,
            expires_at: response.expires_in.map(|secs| now + secs),
        };
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}
