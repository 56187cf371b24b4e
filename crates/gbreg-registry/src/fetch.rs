//! Registry fetcher.

use std::time::Duration;

use reqwest::header::{ACCEPT, CACHE_CONTROL};

use crate::model::Registry;

/// Registry document published by the compiler project.
pub const DEFAULT_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/pytorch/pytorch/main/torch/_dynamo/graph_break_registry.json";

/// Default edge-cache freshness window.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Environment variable overriding the registry URL.
pub const REGISTRY_URL_ENV: &str = "REGISTRY_URL";

/// Environment variable overriding the cache TTL in seconds.
pub const TTL_ENV: &str = "REVALIDATE_SEC";

/// Where to fetch the registry from and how long copies stay fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Registry document URL
    pub url: String,

    /// How long an intermediary cache may serve a copy
    pub ttl: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}

impl RegistryConfig {
    /// Defaults overlaid with `REGISTRY_URL` and `REVALIDATE_SEC`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overlay_env()
    }

    /// Overlay `REGISTRY_URL` and `REVALIDATE_SEC` onto this config.
    pub fn overlay_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values from a variable lookup onto this config.
    ///
    /// Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(REGISTRY_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.url = url.trim().to_string();
        }

        if let Some(raw) = lookup(TTL_ENV).filter(|v| !v.trim().is_empty()) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTtl(raw.clone()))?;
            self.ttl = Duration::from_secs(secs);
        }

        Ok(self)
    }

    /// `Cache-Control` value for responses derived from the registry.
    pub fn cache_control(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate",
            self.ttl.as_secs()
        )
    }
}

/// Invalid registry configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid REVALIDATE_SEC value {0:?}: expected whole seconds")]
    InvalidTtl(String),
}

/// Errors that can occur while fetching the registry.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to fetch registry from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch registry: HTTP {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to decode registry from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// HTTP client bound to one registry source.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    config: RegistryConfig,
}

impl RegistryClient {
    /// Create a client for the given source.
    pub fn new(config: RegistryConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("gbreg/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { http, config })
    }

    /// Fetch a fresh registry snapshot. No retries.
    pub async fn fetch(&self) -> Result<Registry, FetchError> {
        let url = &self.config.url;
        tracing::debug!("Fetching registry from {}", url);

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(
                CACHE_CONTROL,
                format!("max-age={}", self.config.ttl.as_secs()),
            )
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let registry = Registry::from_json(&body).map_err(|source| FetchError::Decode {
            url: url.clone(),
            source,
        })?;

        tracing::debug!("Fetched {} registry ids", registry.len());

        Ok(registry)
    }
}

/// Fetch the registry once with a throwaway client.
pub async fn fetch_registry(config: &RegistryConfig) -> Result<Registry, FetchError> {
    RegistryClient::new(config.clone())?.fetch().await
}
