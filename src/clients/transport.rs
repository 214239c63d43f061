//! The transport seam between the executor and the network.
//!
//! [`Transport`] is the single capability the executor needs: send one
//! request, get back one raw response or a distinguishable network-level
//! failure. [`ReqwestTransport`] is the default implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::clients::http_request::TransportRequest;
use crate::clients::http_response::{HttpResponse, ResponseBody};
use crate::error::ConfigError;

/// A failure that happened before any HTTP response existed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("{0}")]
    Timeout(String),

    /// The connection could not be established or was lost.
    #[error("{0}")]
    Connect(String),
}

/// Sends requests over HTTP.
///
/// Implementations must be safe to share between tasks; the executor holds
/// one transport for its lifetime and reuses it for every call.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends one request and returns the raw response.
    ///
    /// Non-2xx statuses are responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Timeout`] or [`TransportError::Connect`]
    /// when no response could be obtained.
    async fn send(&self, request: &TransportRequest) -> Result<HttpResponse, TransportError>;
}

/// The default transport, backed by a rustls `reqwest::Client`.
///
/// The underlying client pools connections and is built once, at
/// construction, then reused across calls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

// Verify ReqwestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTransport>();
};

impl ReqwestTransport {
    /// Creates a transport with per-attempt read and connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &TransportRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let res = builder.send().await.map_err(map_reqwest_error)?;

        let code = res.status().as_u16();
        let headers = HttpResponse::parse_headers(res.headers());
        let body = res.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            code,
            body: ResponseBody::Text(body),
            headers,
        })
    }
}

// Header values and URLs are validated when the config is built, so
// anything other than a timeout failed on the connection or the body.
fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else {
        TransportError::Connect(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_builds_with_timeouts() {
        let transport = ReqwestTransport::new(Duration::from_secs(1), Duration::from_secs(1));
        assert!(transport.is_ok());
    }

    #[test]
    fn test_transport_error_messages() {
        assert_eq!(
            TransportError::Timeout("deadline elapsed".to_string()).to_string(),
            "deadline elapsed"
        );
        assert_eq!(
            TransportError::Connect("refused".to_string()).to_string(),
            "refused"
        );
    }
}
