//! Client configuration

use inventu_core::storage::{keys, LocalStorage};
use reqwest::Url;

use crate::error::{ApiError, Result};

/// Environment variable naming the default API base URL
pub const BASE_URL_ENV: &str = "VITE_API_URL";

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Connection settings for [`crate::ApiService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token sent as `Authorization`
    pub token: Option<String>,
    /// Sent as `x-api-key` when set
    pub api_key: Option<String>,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            token: None,
            api_key: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Resolve settings from storage and the environment.
    ///
    /// The base URL comes from storage, then `VITE_API_URL`, then the
    /// default. The token comes from storage only.
    pub async fn resolve(storage: &LocalStorage) -> Result<Self> {
        Self::resolve_with(storage, std::env::var(BASE_URL_ENV).ok()).await
    }

    pub(crate) async fn resolve_with(
        storage: &LocalStorage,
        env_base_url: Option<String>,
    ) -> Result<Self> {
        let stored: Option<String> = storage.get(keys::API_BASE_URL).await?;
        let base_url = stored
            .into_iter()
            .chain(env_base_url)
            .find(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let token: Option<String> = storage.get(keys::API_TOKEN).await?;

        Ok(Self {
            base_url: normalize_base_url(&base_url)?,
            token: token.filter(|t| !t.is_empty()),
            api_key: None,
        })
    }
}

/// Validate a base URL and strip trailing slashes
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(trimmed.to_string())
}
