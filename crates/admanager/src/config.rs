//! Credential loading for the Ad Manager API
//!
//! Supports (in order of priority):
//! 1. A ready-made access token in `ADMANAGER_ACCESS_TOKEN`
//! 2. JSON file in the config directory (`admanager-credentials.json`)
//! 3. Runtime environment variables for the refresh-token grant

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{AccessTokenProvider, RefreshTokenAuth, StaticToken};

/// Credentials filename in the config directory
const CREDENTIALS_FILE: &str = "admanager-credentials.json";

/// Environment variable holding a pre-minted access token
pub const ACCESS_TOKEN_ENV: &str = "ADMANAGER_ACCESS_TOKEN";

/// OAuth credentials for the refresh-token grant
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdManagerCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl AdManagerCredentials {
    /// Load credentials from the config file, falling back to environment variables
    pub fn load() -> Result<Self> {
        if config::config_exists(CREDENTIALS_FILE) {
            return config::load_json(CREDENTIALS_FILE);
        }
        Self::from_env()
    }

    /// Load credentials from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        config::load_json_file(path)
    }

    /// Parse credentials from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse credentials JSON")
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("ADMANAGER_CLIENT_ID")
            .context("ADMANAGER_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("ADMANAGER_CLIENT_SECRET")
            .context("ADMANAGER_CLIENT_SECRET environment variable not set")?;
        let refresh_token = std::env::var("ADMANAGER_REFRESH_TOKEN")
            .context("ADMANAGER_REFRESH_TOKEN environment variable not set")?;

        Ok(Self {
            client_id,
            client_secret,
            refresh_token,
        })
    }

    /// Get the default credentials file path
    pub fn default_credentials_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }

    pub fn into_provider(self) -> RefreshTokenAuth {
        RefreshTokenAuth::new(self.client_id, self.client_secret, self.refresh_token)
    }
}

/// Pick a token provider: explicit access token first, then stored credentials
pub fn load_token_provider() -> Result<Arc<dyn AccessTokenProvider>> {
    select_token_provider(std::env::var(ACCESS_TOKEN_ENV).ok(), AdManagerCredentials::load)
}

/// A non-blank access token wins; credentials are only loaded without one
fn select_token_provider(
    access_token: Option<String>,
    load_credentials: impl FnOnce() -> Result<AdManagerCredentials>,
) -> Result<Arc<dyn AccessTokenProvider>> {
    if let Some(token) = access_token
        && !token.trim().is_empty()
    {
        return Ok(Arc::new(StaticToken::new(token.trim())));
    }
    Ok(Arc::new(load_credentials()?.into_provider()))
}
