//! Configuration management for the Site-IQ client.
//!
//! This module handles loading the service endpoint from environment
//! variables, with validation and normalization of the base URL.

use crate::error::SiteIqError;
use std::env;
use url::Url;

/// Base endpoint used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://dfs.site-iq.com";

/// Timeout applied to the auth call and to every ticket-list call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Largest `pageLimit` the ticket endpoint accepts, and the page size used
/// for auto-pagination.
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Environment variable overriding the base endpoint.
pub const BASE_URL_ENV: &str = "SITEIQ_BASE_URL";

/// Configuration for connecting to Site-IQ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the service, normalized without a trailing slash.
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Creates a configuration for an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns `SiteIqError::Config` if the URL is not an absolute
    /// http(s) URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SiteIqError> {
        let base_url = Self::validate_base_url(base_url.into())?;
        Ok(Self { base_url })
    }

    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SITEIQ_BASE_URL` (optional): base URL, defaults to
    ///   [`DEFAULT_BASE_URL`]
    ///
    /// # Errors
    ///
    /// Returns `SiteIqError::Config` if the variable is set to an
    /// invalid URL.
    pub fn from_env() -> Result<Self, SiteIqError> {
        match env::var(BASE_URL_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::new(value),
            _ => Ok(Self::default()),
        }
    }

    /// Validates and normalizes the base URL.
    pub(crate) fn validate_base_url(url: String) -> Result<String, SiteIqError> {
        let url = url.trim().trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SiteIqError::invalid_config(
                "base URL must start with http:// or https://",
            ));
        }

        Url::parse(&url)
            .map_err(|e| SiteIqError::invalid_config(format!("invalid base URL: {}", e)))?;

        Ok(url)
    }
}
