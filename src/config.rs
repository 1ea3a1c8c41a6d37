//! Client configuration from the environment

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8001";

/// Backend calls are slow (LLM-backed), so the bound is generous
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Where the backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Base URL without trailing slash
    pub api_url: String,
    pub request_timeout: Duration,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl StorefrontConfig {
    pub fn new(api_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            request_timeout,
        }
    }

    /// Read `STOREFRONT_API_URL` and `STOREFRONT_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("STOREFRONT_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout = match lookup("STOREFRONT_TIMEOUT_SECS") {
            None => DEFAULT_REQUEST_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: "STOREFRONT_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self::new(api_url.trim(), request_timeout))
    }
}
