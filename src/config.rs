//! Client configuration

use crate::transport::DEFAULT_HISTORY_LIMIT;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

/// Used when no URL is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid value for {name}: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Where the chat service lives and how to talk to it
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub history_limit: usize,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read `CHATLINE_API_URL` (or `REACT_APP_API_URL`), `CHATLINE_HISTORY_LIMIT`
    /// and `CHATLINE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("CHATLINE_API_URL")
            .or_else(|| lookup("REACT_APP_API_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(parse_base_url(&base_url)?);

        if let Some(value) = lookup("CHATLINE_HISTORY_LIMIT") {
            config.history_limit = parse_number("CHATLINE_HISTORY_LIMIT", &value)?;
        }
        if let Some(value) = lookup("CHATLINE_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_number("CHATLINE_TIMEOUT_SECS", &value)?);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Parse and validate a service base URL
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "not a base URL".to_string(),
        });
    }

    Ok(url)
}

fn parse_number<N: std::str::FromStr>(name: &'static str, value: &str) -> Result<N, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}
