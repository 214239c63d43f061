//! Configuration types for the POWO API client.
//!
//! This module provides the configuration used to construct clients.
//! Configuration is immutable once built; per-call variations are produced
//! by merging overrides into a copy rather than mutating shared state.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`PowoConfig`]: The main configuration struct holding all client settings
//! - [`PowoConfigBuilder`]: A builder for constructing [`PowoConfig`] instances
//! - [`ConfigOverrides`]: An enumerated set of optional overrides for [`PowoConfig::merge`]
//! - [`BaseUrl`]: A validated, slash-normalized API base URL
//! - [`UserAgent`]: A validated `User-Agent` value
//! - [`ClientMode`]: The search vocabulary (POWO or IPNI) a client validates against
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use powo_api::PowoConfig;
//!
//! let config = PowoConfig::builder()
//!     .user_agent("my-herbarium/1.0")
//!     .timeout(Duration::from_secs(5))
//!     .max_retries(2)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.max_retries(), 2);
//! ```

mod mode;
mod newtypes;

pub use mode::ClientMode;
pub use newtypes::{BaseUrl, UserAgent};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::clients::{CacheAdapter, CacheOptions, SDK_VERSION};
use crate::error::ConfigError;

/// Default POWO API base URL.
pub const DEFAULT_BASE_URL: &str = "https://powo.science.kew.org/api/2";

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection-open timeout.
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of retries (not counting the first attempt).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Default ceiling for computed backoff delays.
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(8);

/// Option keys accepted by [`PowoConfig::with_options`].
pub const OPTION_KEYS: &[&str] = &[
    "base_url",
    "user_agent",
    "timeout",
    "open_timeout",
    "max_retries",
    "retries",
    "backoff_base",
    "backoff_max",
    "cache",
    "cache_options",
    "cache_namespace",
    "terms_path",
];

/// Configuration for the POWO API client.
///
/// # Thread Safety
///
/// `PowoConfig` is `Clone`, `Send`, and `Sync`. The optional cache adapter
/// is shared behind an [`Arc`], so clones point at the same cache.
///
/// # Example
///
/// ```rust
/// use powo_api::PowoConfig;
///
/// let config = PowoConfig::builder().build().unwrap();
/// assert_eq!(config.base_url().as_ref(), "https://powo.science.kew.org/api/2/");
/// assert!(config.retries());
/// ```
#[derive(Clone, Debug)]
pub struct PowoConfig {
    base_url: BaseUrl,
    user_agent: UserAgent,
    timeout: Duration,
    open_timeout: Duration,
    max_retries: u32,
    retries: bool,
    backoff_base: Duration,
    backoff_max: Duration,
    cache: Option<Arc<dyn CacheAdapter>>,
    cache_options: CacheOptions,
    cache_namespace: Option<String>,
    terms_path: Option<PathBuf>,
}

// Verify PowoConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PowoConfig>();
};

impl PowoConfig {
    /// Creates a new builder for constructing a `PowoConfig`.
    #[must_use]
    pub fn builder() -> PowoConfigBuilder {
        PowoConfigBuilder::new()
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the `User-Agent` sent with every request.
    #[must_use]
    pub const fn user_agent(&self) -> &UserAgent {
        &self.user_agent
    }

    /// Returns the per-attempt request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the connection-open timeout.
    #[must_use]
    pub const fn open_timeout(&self) -> Duration {
        self.open_timeout
    }

    /// Returns the number of retries after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns whether retries are enabled.
    #[must_use]
    pub const fn retries(&self) -> bool {
        self.retries
    }

    /// Returns the base delay for exponential backoff.
    #[must_use]
    pub const fn backoff_base(&self) -> Duration {
        self.backoff_base
    }

    /// Returns the ceiling for computed backoff delays.
    #[must_use]
    pub const fn backoff_max(&self) -> Duration {
        self.backoff_max
    }

    /// Returns the cache adapter, if configured.
    #[must_use]
    pub fn cache(&self) -> Option<&Arc<dyn CacheAdapter>> {
        self.cache.as_ref()
    }

    /// Returns the options passed to the cache adapter on every fetch.
    #[must_use]
    pub const fn cache_options(&self) -> &CacheOptions {
        &self.cache_options
    }

    /// Returns the cache key namespace, if configured.
    #[must_use]
    pub fn cache_namespace(&self) -> Option<&str> {
        self.cache_namespace.as_deref()
    }

    /// Returns the path of the allow-list vocabulary file, if configured.
    #[must_use]
    pub fn terms_path(&self) -> Option<&Path> {
        self.terms_path.as_deref()
    }

    /// Returns a copy of this configuration with `overrides` applied.
    ///
    /// `self` is left untouched. Every overridden value is validated the same
    /// way the builder validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an overridden value is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use powo_api::{ConfigOverrides, PowoConfig};
    ///
    /// let base = PowoConfig::builder().build().unwrap();
    /// let fast = base
    ///     .merge(&ConfigOverrides { timeout: Some(2.0), ..ConfigOverrides::default() })
    ///     .unwrap();
    ///
    /// assert_eq!(fast.timeout().as_secs(), 2);
    /// assert_eq!(base.timeout().as_secs(), 10);
    /// ```
    pub fn merge(&self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut merged = self.clone();

        if let Some(url) = &overrides.base_url {
            merged.base_url = BaseUrl::new(url.as_str())?;
        }
        if let Some(agent) = &overrides.user_agent {
            merged.user_agent = UserAgent::new(agent.as_str())?;
        }
        if let Some(secs) = overrides.timeout {
            merged.timeout = seconds("timeout", secs)?;
        }
        if let Some(secs) = overrides.open_timeout {
            merged.open_timeout = seconds("open_timeout", secs)?;
        }
        if let Some(max_retries) = overrides.max_retries {
            merged.max_retries = max_retries;
        }
        if let Some(retries) = overrides.retries {
            merged.retries = retries;
        }
        if let Some(secs) = overrides.backoff_base {
            merged.backoff_base = seconds("backoff_base", secs)?;
        }
        if let Some(secs) = overrides.backoff_max {
            merged.backoff_max = seconds("backoff_max", secs)?;
        }
        if let Some(options) = &overrides.cache_options {
            merged.cache_options = CacheOptions {
                expires_in: options
                    .expires_in
                    .map(|secs| seconds("cache_options.expires_in", secs))
                    .transpose()?,
            };
        }
        if let Some(namespace) = &overrides.cache_namespace {
            merged.cache_namespace = non_blank(namespace);
        }
        if let Some(path) = &overrides.terms_path {
            merged.terms_path = Some(path.clone());
        }

        Ok(merged)
    }

    /// Returns a copy of this configuration with a loosely-typed option map applied.
    ///
    /// Keys must come from [`OPTION_KEYS`]. Values use JSON types, with
    /// durations given in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownOptions`] listing every unrecognized key,
    /// or [`ConfigError::InvalidOption`] for a value of the wrong type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use powo_api::{ConfigError, PowoConfig};
    /// use serde_json::json;
    ///
    /// let base = PowoConfig::builder().build().unwrap();
    ///
    /// let options = json!({ "max_retries": 0, "retries": false });
    /// let merged = base.with_options(options.as_object().unwrap()).unwrap();
    /// assert!(!merged.retries());
    ///
    /// let options = json!({ "colour": "green" });
    /// let result = base.with_options(options.as_object().unwrap());
    /// assert!(matches!(result, Err(ConfigError::UnknownOptions { .. })));
    /// ```
    pub fn with_options(&self, options: &Map<String, Value>) -> Result<Self, ConfigError> {
        let mut unknown: Vec<String> = options
            .keys()
            .filter(|key| !OPTION_KEYS.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(ConfigError::UnknownOptions { keys: unknown });
        }

        if options.contains_key("cache") {
            return Err(ConfigError::InvalidOption {
                key: "cache".to_string(),
                reason: "cache adapters cannot be given as data; use PowoConfigBuilder::cache"
                    .to_string(),
            });
        }

        let overrides = ConfigOverrides::from_options(options)?;
        self.merge(&overrides)
    }
}

/// An enumerated set of optional configuration overrides.
///
/// Durations are expressed in seconds. Absent (or `null`) fields keep the
/// base configuration's value.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    /// API base URL.
    pub base_url: Option<String>,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
    /// Per-attempt request timeout, in seconds.
    pub timeout: Option<f64>,
    /// Connection-open timeout, in seconds.
    pub open_timeout: Option<f64>,
    /// Retries after the first attempt.
    pub max_retries: Option<u32>,
    /// Enables or disables retries.
    pub retries: Option<bool>,
    /// Backoff base delay, in seconds.
    pub backoff_base: Option<f64>,
    /// Backoff ceiling, in seconds.
    pub backoff_max: Option<f64>,
    /// Options passed to the cache adapter.
    pub cache_options: Option<CacheOptionsOverride>,
    /// Cache key namespace. A blank value clears it.
    pub cache_namespace: Option<String>,
    /// Allow-list vocabulary file.
    pub terms_path: Option<PathBuf>,
}

/// Cache option overrides, with durations in seconds.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CacheOptionsOverride {
    /// Entry time-to-live, in seconds.
    pub expires_in: Option<f64>,
}

impl ConfigOverrides {
    fn from_options(options: &Map<String, Value>) -> Result<Self, ConfigError> {
        // Deserialize key by key first so a type error names the offending option.
        for (key, value) in options {
            let mut single = Map::new();
            single.insert(key.clone(), value.clone());
            serde_json::from_value::<Self>(Value::Object(single)).map_err(|e| {
                ConfigError::InvalidOption {
                    key: key.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        serde_json::from_value(Value::Object(options.clone())).map_err(|e| {
            ConfigError::InvalidOption {
                key: "options".to_string(),
                reason: e.to_string(),
            }
        })
    }
}

fn seconds(key: &str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidOption {
        key: key.to_string(),
        reason: format!("expected a non-negative number of seconds, got {secs}"),
    })
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Builder for constructing [`PowoConfig`] instances.
///
/// Every field has a default, so `PowoConfig::builder().build()` yields a
/// working configuration for the public POWO API.
///
/// # Defaults
///
/// - `base_url`: [`DEFAULT_BASE_URL`]
/// - `user_agent`: `powo_api/<crate version>`
/// - `timeout`: 10 seconds; `open_timeout`: 5 seconds
/// - `max_retries`: 3; `retries`: `true`
/// - `backoff_base`: 0.5 seconds; `backoff_max`: 8 seconds
/// - `cache`: `None`; `cache_namespace`: `None`
/// - `terms_path`: `None` (built-in allow-lists)
#[derive(Debug, Default)]
pub struct PowoConfigBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    open_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retries: Option<bool>,
    backoff_base: Option<Duration>,
    backoff_max: Option<Duration>,
    cache: Option<Arc<dyn CacheAdapter>>,
    cache_options: Option<CacheOptions>,
    cache_namespace: Option<String>,
    terms_path: Option<PathBuf>,
}

impl PowoConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Sets the per-attempt request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection-open timeout.
    #[must_use]
    pub const fn open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = Some(timeout);
        self
    }

    /// Sets the number of retries after the first attempt.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Enables or disables retries.
    #[must_use]
    pub const fn retries(mut self, enabled: bool) -> Self {
        self.retries = Some(enabled);
        self
    }

    /// Sets the base delay for exponential backoff.
    #[must_use]
    pub const fn backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = Some(base);
        self
    }

    /// Sets the ceiling for computed backoff delays.
    #[must_use]
    pub const fn backoff_max(mut self, max: Duration) -> Self {
        self.backoff_max = Some(max);
        self
    }

    /// Sets the cache adapter.
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn CacheAdapter>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the options passed to the cache adapter.
    #[must_use]
    pub const fn cache_options(mut self, options: CacheOptions) -> Self {
        self.cache_options = Some(options);
        self
    }

    /// Sets the cache key namespace.
    #[must_use]
    pub fn cache_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.cache_namespace = Some(namespace.into());
        self
    }

    /// Sets the allow-list vocabulary file.
    #[must_use]
    pub fn terms_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.terms_path = Some(path.into());
        self
    }

    /// Builds the [`PowoConfig`], validating the base URL and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`], [`ConfigError::InvalidBaseUrl`]
    /// or [`ConfigError::EmptyUserAgent`].
    pub fn build(self) -> Result<PowoConfig, ConfigError> {
        let base_url = BaseUrl::new(
            self.base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )?;
        let user_agent = UserAgent::new(
            self.user_agent
                .unwrap_or_else(|| format!("powo_api/{SDK_VERSION}")),
        )?;

        Ok(PowoConfig {
            base_url,
            user_agent,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            open_timeout: self.open_timeout.unwrap_or(DEFAULT_OPEN_TIMEOUT),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retries: self.retries.unwrap_or(true),
            backoff_base: self.backoff_base.unwrap_or(DEFAULT_BACKOFF_BASE),
            backoff_max: self.backoff_max.unwrap_or(DEFAULT_BACKOFF_MAX),
            cache: self.cache,
            cache_options: self.cache_options.unwrap_or_default(),
            cache_namespace: self.cache_namespace.as_deref().and_then(non_blank),
            terms_path: self.terms_path,
        })
    }
}
