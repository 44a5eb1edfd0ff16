//! Settings loaded from `QONTINUI_*` environment variables

use std::fmt;
use std::time::Duration;

use crate::{Error, Result};

pub const ENV_API_URL: &str = "QONTINUI_API_URL";
pub const ENV_ACCESS_TOKEN: &str = "QONTINUI_ACCESS_TOKEN";
pub const ENV_EMAIL: &str = "QONTINUI_EMAIL";
pub const ENV_PASSWORD: &str = "QONTINUI_PASSWORD";
pub const ENV_API_TIMEOUT: &str = "QONTINUI_API_TIMEOUT";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection and authentication settings for the backend.
#[derive(Clone)]
pub struct Settings {
    /// Backend base URL, without trailing slash
    pub api_url: String,
    /// Pre-issued bearer token
    pub access_token: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Settings {
    /// Build settings for `api_url` with no credentials and the default timeout.
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let settings = Self {
            api_url: normalize_url(&api_url.into()),
            access_token: None,
            email: None,
            password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get(ENV_API_URL)
            .ok_or_else(|| Error::Config(format!("{} is required", ENV_API_URL)))?;

        let timeout = match get(ENV_API_TIMEOUT) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!("{} must be a whole number of seconds", ENV_API_TIMEOUT))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let settings = Self {
            api_url: normalize_url(&api_url),
            access_token: get(ENV_ACCESS_TOKEN),
            email: get(ENV_EMAIL),
            password: get(ENV_PASSWORD),
            timeout,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the URL is usable.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(Error::Config(format!("{} is required", ENV_API_URL)));
        }
        let url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| Error::Config(format!("invalid {}: {}", ENV_API_URL, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "{} must use http or https, got '{}'",
                ENV_API_URL,
                url.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config(format!("{} must be positive", ENV_API_TIMEOUT)));
        }
        Ok(())
    }

    /// Whether both email and password are configured.
    pub fn has_credentials(&self) -> bool {
        self.email.is_some() && self.password.is_some()
    }

    /// Whether a pre-issued token is configured.
    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_url", &self.api_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
