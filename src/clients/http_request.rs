//! HTTP request types for the POWO API client.
//!
//! This module provides [`HttpMethod`] and the [`TransportRequest`] handed
//! to a [`Transport`](crate::clients::Transport).

use std::fmt;

/// HTTP methods the client can issue.
///
/// The POWO API is read-only, so only `GET` is used by the endpoint
/// wrappers. The method is still part of every cache key and failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    #[default]
    Get,
    /// HTTP HEAD method.
    Head,
}

impl HttpMethod {
    /// Returns the uppercase method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Head => Self::HEAD,
        }
    }
}

/// A fully resolved request, ready to be sent by a transport.
///
/// Query pairs are already flattened and stringified; the transport is
/// responsible for encoding them onto the URL.
///
/// # Example
///
/// ```rust
/// use powo_api::{HttpMethod, TransportRequest};
///
/// let request = TransportRequest {
///     method: HttpMethod::Get,
///     url: "https://powo.science.kew.org/api/2/search".to_string(),
///     headers: vec![("Accept".to_string(), "application/json".to_string())],
///     query: vec![("q".to_string(), "Acacia".to_string())],
/// };
///
/// assert_eq!(request.header("accept"), Some("application/json"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The absolute URL, without query string.
    pub url: String,
    /// Request headers, in send order.
    pub headers: Vec<(String, String)>,
    /// Query parameters, in send order. Keys may repeat.
    pub query: Vec<(String, String)>,
}

impl TransportRequest {
    /// Returns the first value of a request header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
