//! Client configuration.
//!
//! The only required setting is the backend API base URL, supplied
//! explicitly by the embedder or read from `SHHAVA_API_BASE_URL`.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::error::ConfigError;

/// Environment variable holding the backend API base URL.
pub const API_BASE_URL_VAR: &str = "SHHAVA_API_BASE_URL";

/// Configuration for the client core.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    /// Build a config from an explicit base URL, e.g. `https://api.shhava.com`.
    ///
    /// A trailing slash is stripped so endpoint paths join cleanly.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no `http`/`https` scheme.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let mut base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { base_url })
    }

    /// Build a config from `SHHAVA_API_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or not an HTTP(S) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(API_BASE_URL_VAR)
            .map_err(|_| ConfigError::MissingVar { var: API_BASE_URL_VAR })?;
        Self::new(base_url)
    }

    /// The API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
