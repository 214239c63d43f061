//! Error types for client configuration.
//!
//! This module contains the error raised while building a [`PowoConfig`]
//! or wiring a client from it. Configuration failures are fatal and never
//! retried.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use powo_api::{BaseUrl, ConfigError};
//!
//! let result = BaseUrl::new("   ");
//! assert!(matches!(result, Err(ConfigError::EmptyBaseUrl)));
//! ```
//!
//! [`PowoConfig`]: crate::PowoConfig

use thiserror::Error;

/// Errors that can occur during client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL cannot be blank.
    #[error("base_url must be provided")]
    EmptyBaseUrl,

    /// Base URL is not an absolute http(s) URL.
    #[error("Invalid base_url '{url}'. Expected an absolute http(s) URL (e.g., 'https://powo.science.kew.org/api/2').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// User agent cannot be blank.
    #[error("user_agent must be provided")]
    EmptyUserAgent,

    /// User agent is not a valid HTTP header value.
    #[error("Invalid user_agent {agent:?}. Header values cannot contain control characters.")]
    InvalidUserAgent {
        /// The invalid user agent that was provided.
        agent: String,
    },

    /// One or more option keys are not recognized.
    #[error("Unknown client option keys: {keys:?}")]
    UnknownOptions {
        /// The unrecognized keys, sorted.
        keys: Vec<String>,
    },

    /// An option value has the wrong type or is out of range.
    #[error("Invalid value for option '{key}': {reason}")]
    InvalidOption {
        /// The option key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The client mode is not one of the supported modes.
    #[error("Unknown client mode '{mode}' (expected 'powo' or 'ipni')")]
    UnknownClientMode {
        /// The mode that was provided.
        mode: String,
    },

    /// The underlying HTTP client could not be created.
    #[error("Failed to create HTTP client: {reason}")]
    HttpClient {
        /// The reason reported by the HTTP stack.
        reason: String,
    },
}
