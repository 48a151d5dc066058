use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use adoption_api::{AdoptionApiClient, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::credentials::{CredentialStore, FileStorage};

const DEFAULT_TOKEN_PATH: &str = ".adoption-session";

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub api_base_url: String,
    pub api_timeout: Duration,
    /// Directory holding the persisted session token
    pub token_path: PathBuf,
}

impl StoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_timeout = match lookup("ADOPTION_API_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .context("ADOPTION_API_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_base_url: lookup("ADOPTION_API_BASE_URL")
                .filter(|url| !url.trim().is_empty())
                .context("ADOPTION_API_BASE_URL must be set")?,
            api_timeout,
            token_path: lookup("ADOPTION_TOKEN_PATH")
                .unwrap_or_else(|| DEFAULT_TOKEN_PATH.to_string())
                .into(),
        })
    }

    pub fn api_client(&self) -> Result<AdoptionApiClient> {
        AdoptionApiClient::with_timeout(&self.api_base_url, self.api_timeout)
            .context("Failed to build API client")
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(Arc::new(FileStorage::new(&self.token_path)))
    }
}
