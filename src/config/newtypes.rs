//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use reqwest::header::HeaderValue;
use std::fmt;

/// A validated API base URL.
///
/// The URL must be an absolute `http` or `https` URL. It is normalized to
/// end with exactly one trailing slash so relative endpoint paths can be
/// appended without doubling or dropping separators.
///
/// # Example
///
/// ```rust
/// use powo_api::BaseUrl;
///
/// let base = BaseUrl::new("https://powo.science.kew.org/api/2").unwrap();
/// assert_eq!(base.as_ref(), "https://powo.science.kew.org/api/2/");
/// assert_eq!(base.join("/search"), "https://powo.science.kew.org/api/2/search");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`] if the value is blank and
    /// [`ConfigError::InvalidBaseUrl`] if it is not an absolute http(s) URL.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let parsed = url::Url::parse(trimmed).map_err(|_| ConfigError::InvalidBaseUrl {
            url: trimmed.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: trimmed.to_string(),
            });
        }

        let mut normalized = trimmed.trim_end_matches('/').to_string();
        normalized.push('/');
        Ok(Self(normalized))
    }

    /// Joins an endpoint path onto this base.
    ///
    /// Leading slashes on `path` are stripped, so `"search"` and `"/search"`
    /// resolve to the same URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated `User-Agent` header value.
///
/// # Example
///
/// ```rust
/// use powo_api::UserAgent;
///
/// let agent = UserAgent::new("my-herbarium/1.0").unwrap();
/// assert_eq!(agent.as_ref(), "my-herbarium/1.0");
/// assert!(UserAgent::new(" ").is_err());
/// assert!(UserAgent::new("my-herbarium\n1.0").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserAgent(String);

impl UserAgent {
    /// Creates a new validated user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUserAgent`] if the value is blank and
    /// [`ConfigError::InvalidUserAgent`] if it cannot be sent as a header.
    pub fn new(agent: impl Into<String>) -> Result<Self, ConfigError> {
        let agent = agent.into();
        if agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        if HeaderValue::from_str(&agent).is_err() {
            return Err(ConfigError::InvalidUserAgent { agent });
        }
        Ok(Self(agent))
    }
}

impl AsRef<str> for UserAgent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
