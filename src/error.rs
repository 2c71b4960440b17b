//! Error types for the Site-IQ client.
//!
//! This module defines `SiteIqError`, the unified error type returned by
//! every fallible operation in the crate.
//!
//! # Families
//!
//! - `NotConnected`: an operation needing a session ran before `connect`.
//! - `InvalidArgument`: the caller broke a parameter contract. Raised before
//!   any request is sent.
//! - `Authentication`: the service rejected the credentials (401/403).
//! - Service errors (`HttpStatus`, `Http`, `Timeout`, `Serialization`): any
//!   other failed exchange. See [`SiteIqError::is_service_error`].
//!
//! Nothing is retried. Tokens and passwords must be run through
//! [`SiteIqError::sanitize_message`] before they can reach a log line.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for all Site-IQ operations.
#[derive(Error, Debug)]
pub enum SiteIqError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// An operation requiring a session was attempted before `connect`.
    #[error("not connected - call connect() first")]
    NotConnected,

    /// A client-side parameter contract was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The service rejected the credentials (HTTP 401 or 403).
    #[error("authentication failed (HTTP {status}) - check email and password")]
    Authentication {
        /// The status code returned by the auth endpoint.
        status: reqwest::StatusCode,
    },

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The (truncated) response body.
        body: String,
    },

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Request timed out.
    #[error("request timed out after {duration:?} ({operation})")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SiteIqError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        SiteIqError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        SiteIqError::Config(message.into())
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        SiteIqError::InvalidArgument(message.into())
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        SiteIqError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Returns true for failed exchanges with the service: non-success
    /// statuses other than 401/403, transport failures, timeouts and
    /// undecodable bodies.
    #[must_use]
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            SiteIqError::HttpStatus { .. }
                | SiteIqError::Http(_)
                | SiteIqError::Timeout { .. }
                | SiteIqError::Serialization(_)
        )
    }

    /// Returns true if the service rejected the credentials.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, SiteIqError::Authentication { .. })
    }

    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            SiteIqError::Authentication { status } | SiteIqError::HttpStatus { status, .. } => {
                Some(*status)
            }
            SiteIqError::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Replaces every occurrence of `secret` in `message` with `[REDACTED]`.
    ///
    /// Use this on anything derived from a response or a transport error
    /// before logging it, passing the bearer token or password.
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }
}
