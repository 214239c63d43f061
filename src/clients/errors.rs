//! Request failure types for the POWO API client.
//!
//! Every failed round-trip is reported as a single [`RequestError`] whose
//! [`FailureKind`] tells callers what went wrong. The error always carries
//! the method and URL of the request, and carries the status, body and
//! headers when a response was received.
//!
//! # Error Handling
//!
//! - [`FailureKind::RateLimited`] and [`FailureKind::ServerError`] are
//!   transient and retried by the [`RetryPolicy`](crate::clients::RetryPolicy)
//! - [`FailureKind::ClientError`] and [`FailureKind::ParseError`] are
//!   surfaced on first occurrence
//! - [`FailureKind::Timeout`] and [`FailureKind::ConnectionFailed`] happen
//!   before any response exists and never carry a status
//!
//! # Example
//!
//! ```rust,ignore
//! use powo_api::{FailureKind, RequestError};
//!
//! match client.http_client().get("search", &params).await {
//!     Ok(json) => println!("{json}"),
//!     Err(e) if e.kind == FailureKind::RateLimited => {
//!         println!("slow down, retry after {:?}", e.retry_after());
//!     }
//!     Err(e) => println!("{} {} failed: {e}", e.method, e.url),
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::clients::http_request::HttpMethod;
use crate::clients::http_response::ResponseBody;

/// The reason a request failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    ServerError,
    /// HTTP 4xx other than 429.
    ClientError,
    /// A success status whose body is not valid JSON.
    ParseError,
    /// The transport gave up waiting for a response.
    Timeout,
    /// The transport could not reach the server.
    ConnectionFailed,
}

impl FailureKind {
    /// Returns `true` for the kinds the retry policy will retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::ClientError => "client_error",
            Self::ParseError => "parse_error",
            Self::Timeout => "timeout",
            Self::ConnectionFailed => "connection_failed",
        };
        f.write_str(name)
    }
}

/// A failed request, with everything needed to diagnose it.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use powo_api::{FailureKind, HttpMethod, RequestError};
///
/// let error = RequestError::timeout(
///     HttpMethod::Get,
///     "https://powo.science.kew.org/api/2/search",
///     "operation timed out",
/// );
///
/// assert_eq!(error.kind, FailureKind::Timeout);
/// assert_eq!(error.status, None);
/// assert!(!error.is_retryable());
/// ```
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct RequestError {
    /// Why the request failed.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
    /// HTTP status, absent for timeouts and connection failures.
    pub status: Option<u16>,
    /// The request method.
    pub method: HttpMethod,
    /// The absolute request URL, without query string.
    pub url: String,
    /// The raw response body, if a response was received.
    pub body: Option<ResponseBody>,
    /// Response headers, keyed by lowercase name.
    pub headers: HashMap<String, Vec<String>>,
}

impl RequestError {
    /// Creates a failure for a transport timeout.
    #[must_use]
    pub fn timeout(method: HttpMethod, url: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self::without_response(
            FailureKind::Timeout,
            format!("POWO request timed out: {detail}"),
            method,
            url.into(),
        )
    }

    /// Creates a failure for a connection that could not be established.
    #[must_use]
    pub fn connection_failed(
        method: HttpMethod,
        url: impl Into<String>,
        detail: impl fmt::Display,
    ) -> Self {
        Self::without_response(
            FailureKind::ConnectionFailed,
            format!("POWO connection failed: {detail}"),
            method,
            url.into(),
        )
    }

    fn without_response(kind: FailureKind, message: String, method: HttpMethod, url: String) -> Self {
        Self {
            kind,
            message,
            status: None,
            method,
            url,
            body: None,
            headers: HashMap::new(),
        }
    }

    /// Returns `true` if the retry policy would retry this failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns the `Retry-After` delay in seconds for a rate-limited failure.
    ///
    /// Only numeric, finite, non-negative values are honored. Any other
    /// failure kind returns `None`.
    #[must_use]
    pub fn retry_after(&self) -> Option<f64> {
        if self.kind != FailureKind::RateLimited {
            return None;
        }
        self.header("retry-after")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
    }

    /// Returns the first value of a response header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limited(retry_after: Option<&str>) -> RequestError {
        let mut headers = HashMap::new();
        if let Some(value) = retry_after {
            headers.insert("retry-after".to_string(), vec![value.to_string()]);
        }
        RequestError {
            kind: FailureKind::RateLimited,
            message: "Rate limited by POWO (HTTP 429)".to_string(),
            status: Some(429),
            method: HttpMethod::Get,
            url: "https://example.test/search".to_string(),
            body: None,
            headers,
        }
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(FailureKind::RateLimited.is_retryable());
        assert!(FailureKind::ServerError.is_retryable());
        assert!(!FailureKind::ClientError.is_retryable());
        assert!(!FailureKind::ParseError.is_retryable());
        assert!(!FailureKind::Timeout.is_retryable());
        assert!(!FailureKind::ConnectionFailed.is_retryable());
    }

    #[test]
    fn test_retry_after_parses_numeric_header() {
        assert_eq!(rate_limited(Some("3")).retry_after(), Some(3.0));
        assert_eq!(rate_limited(Some(" 0.5 ")).retry_after(), Some(0.5));
    }

    #[test]
    fn test_retry_after_ignores_invalid_values() {
        assert_eq!(rate_limited(None).retry_after(), None);
        assert_eq!(rate_limited(Some("soon")).retry_after(), None);
        assert_eq!(rate_limited(Some("-1")).retry_after(), None);
        assert_eq!(rate_limited(Some("NaN")).retry_after(), None);
    }

    #[test]
    fn test_retry_after_only_for_rate_limited() {
        let mut error = rate_limited(Some("3"));
        error.kind = FailureKind::ServerError;
        assert_eq!(error.retry_after(), None);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut error = rate_limited(None);
        error
            .headers
            .insert("Retry-After".to_string(), vec!["7".to_string()]);
        assert_eq!(error.header("retry-after"), Some("7"));
        assert_eq!(error.retry_after(), Some(7.0));
    }

    #[test]
    fn test_transport_failures_carry_no_status() {
        let timeout = RequestError::timeout(HttpMethod::Get, "https://example.test", "deadline");
        assert_eq!(timeout.kind, FailureKind::Timeout);
        assert_eq!(timeout.status, None);
        assert!(timeout.to_string().contains("timed out"));

        let refused =
            RequestError::connection_failed(HttpMethod::Get, "https://example.test", "refused");
        assert_eq!(refused.kind, FailureKind::ConnectionFailed);
        assert!(refused.body.is_none());
        assert!(refused.headers.is_empty());
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = rate_limited(None);
        let _: &dyn std::error::Error = &error;
    }
}
