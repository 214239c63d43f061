//! HTTP response types for the POWO API client.
//!
//! This module provides the raw [`HttpResponse`] returned by a transport,
//! before it is classified into a JSON payload or a failure.

use std::collections::HashMap;

use serde_json::Value;

/// A response body as produced by a transport.
///
/// Network transports return text. Test doubles and custom transports may
/// hand back an already-decoded JSON value, which is passed through
/// unchanged on success.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    /// Undecoded body text.
    Text(String),
    /// An already-structured body.
    Json(Value),
}

impl ResponseBody {
    /// Returns the body as text, serializing a structured body.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ResponseBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// A raw HTTP response: status, body and headers.
///
/// Header names are stored lowercase. A header may carry several values.
///
/// # Example
///
/// ```rust
/// use powo_api::HttpResponse;
///
/// let response = HttpResponse::new(429, "")
///     .with_header("Retry-After", "2");
///
/// assert_eq!(response.code, 429);
/// assert_eq!(response.header("retry-after"), Some("2"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// The response body.
    pub body: ResponseBody,
    /// Response headers, keyed by lowercase name.
    pub headers: HashMap<String, Vec<String>>,
}

impl HttpResponse {
    /// Creates a response with no headers.
    #[must_use]
    pub fn new(code: u16, body: impl Into<ResponseBody>) -> Self {
        Self {
            code,
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Adds a header value, lowercasing the name.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// Returns the first value of a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns `true` if the status code is 2xx.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Collects reqwest response headers into a lowercase, multi-valued map.
    pub(crate) fn parse_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
