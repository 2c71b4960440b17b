//! Credential providers.
//!
//! The client only needs an email/password pair at connect time. Where the
//! pair comes from is the caller's concern; this module defines the seam and
//! the two providers the crate ships with.

use std::env;
use std::fmt;

use crate::error::SiteIqError;

/// Environment variable holding the account email.
pub const EMAIL_ENV: &str = "SITEIQ_EMAIL";

/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "SITEIQ_PASSWORD";

/// An email/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email, also used as the session identity.
    pub email: String,
    /// Account password. Never logged.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Source of credentials for [`SiteIqClient::connect_with`].
///
/// [`SiteIqClient::connect_with`]: crate::client::SiteIqClient::connect_with
pub trait CredentialProvider {
    /// Produces an email/password pair.
    fn credentials(&self) -> Result<Credentials, SiteIqError>;
}

/// A provider that always returns the same pair.
#[derive(Debug, Clone)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    /// Wraps a fixed email/password pair.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self(Credentials::new(email, password))
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Result<Credentials, SiteIqError> {
        Ok(self.0.clone())
    }
}

/// Reads `SITEIQ_EMAIL` and `SITEIQ_PASSWORD` from the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    fn get_required_env(name: &str) -> Result<String, SiteIqError> {
        env::var(name)
            .map_err(|_| SiteIqError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(SiteIqError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<Credentials, SiteIqError> {
        let email = Self::get_required_env(EMAIL_ENV)?.trim().to_string();
        let password = Self::get_required_env(PASSWORD_ENV)?;
        Ok(Credentials { email, password })
    }
}
