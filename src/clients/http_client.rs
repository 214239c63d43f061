//! HTTP client for POWO API communication.
//!
//! This module provides the [`HttpClient`] type, which turns a method, a
//! path and a parameter map into a parsed JSON value: it resolves the URL,
//! consults the cache, and sends through the retry policy and the
//! response classifier.

use std::sync::Arc;

use serde_json::Value;

use crate::clients::cache_key::{flatten_params, CacheKeyBuilder, Params};
use crate::clients::cache_store::CacheStore;
use crate::clients::errors::RequestError;
use crate::clients::http_request::{HttpMethod, TransportRequest};
use crate::clients::response_classifier::ResponseClassifier;
use crate::clients::retry_policy::RetryPolicy;
use crate::clients::transport::{ReqwestTransport, Transport, TransportError};
use crate::config::{BaseUrl, PowoConfig, UserAgent};
use crate::error::ConfigError;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Executes requests against the POWO API.
///
/// The client handles:
/// - URL construction from the configured base URL
/// - Default headers (`Accept: application/json` and `User-Agent`)
/// - Cache lookup keyed on method, URL and canonicalized parameters
/// - Automatic retry of 429 and 5xx responses
/// - Mapping of timeouts and connection failures to typed errors
///
/// All collaborators are wired at construction and never rebound.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use powo_api::{HttpClient, PowoConfig};
/// use serde_json::json;
///
/// let config = PowoConfig::builder().build()?;
/// let client = HttpClient::new(&config)?;
///
/// let params = json!({ "q": "Acacia", "perPage": 10 });
/// let body = client.get("search", params.as_object().unwrap()).await?;
/// println!("{}", body["totalResults"]);
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    base_url: BaseUrl,
    user_agent: UserAgent,
    cache_store: CacheStore,
    cache_keys: CacheKeyBuilder,
    retry_policy: RetryPolicy,
    classifier: ResponseClassifier,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a client that sends requests with reqwest.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP stack cannot be
    /// initialized.
    ///
    /// # Example
    ///
    /// ```rust
    /// use powo_api::{HttpClient, PowoConfig};
    ///
    /// let config = PowoConfig::builder().build().unwrap();
    /// let client = HttpClient::new(&config).unwrap();
    ///
    /// assert_eq!(client.base_url().as_ref(), "https://powo.science.kew.org/api/2/");
    /// ```
    pub fn new(config: &PowoConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(config.timeout(), config.open_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client that sends requests through `transport`.
    #[must_use]
    pub fn with_transport(config: &PowoConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: config.base_url().clone(),
            user_agent: config.user_agent().clone(),
            cache_store: CacheStore::new(config.cache().cloned(), *config.cache_options()),
            cache_keys: CacheKeyBuilder::new(config.cache_namespace(), SDK_VERSION),
            retry_policy: RetryPolicy::from_config(config),
            classifier: ResponseClassifier,
        }
    }

    /// Returns the base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.user_agent.as_ref().to_string()),
        ]
    }

    /// Returns the cache key for a request, without sending it.
    #[must_use]
    pub fn cache_key(&self, method: HttpMethod, path: &str, params: &Params) -> String {
        self.cache_keys
            .build(method, &self.base_url.join(path), params)
    }

    /// Sends a `GET` request.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn get(&self, path: &str, params: &Params) -> Result<Value, RequestError> {
        self.request(HttpMethod::Get, path, params).await
    }

    /// Sends a request and returns the parsed JSON body.
    ///
    /// The result is served from the cache when one is configured and holds
    /// the key; otherwise the request is sent, retried per the
    /// [`RetryPolicy`], and a successful result is stored.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] with kind:
    /// - `RateLimited` or `ServerError` once retries are exhausted
    /// - `ClientError` for other 4xx responses
    /// - `ParseError` for an undecodable success body
    /// - `Timeout` or `ConnectionFailed` when no response was received
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        params: &Params,
    ) -> Result<Value, RequestError> {
        let url = self.base_url.join(path);
        let key = self.cache_keys.build(method, &url, params);
        let request = TransportRequest {
            method,
            url,
            headers: self.default_headers(),
            query: flatten_params(params),
        };

        tracing::debug!(cache_key = %key, "Dispatching {} {}", method, request.url);

        let compute = self
            .retry_policy
            .with_retry(method, &request.url, || self.send_once(&request));
        self.cache_store.fetch(&key, Box::pin(compute)).await
    }

    async fn send_once(&self, request: &TransportRequest) -> Result<Value, RequestError> {
        match self.transport.send(request).await {
            Ok(response) => self
                .classifier
                .classify(response, request.method, &request.url),
            Err(TransportError::Timeout(detail)) => Err(RequestError::timeout(
                request.method,
                request.url.as_str(),
                detail,
            )),
            Err(TransportError::Connect(detail)) => Err(RequestError::connection_failed(
                request.method,
                request.url.as_str(),
                detail,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{FailureKind, HttpResponse};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct RecordingTransport {
        outcomes: Mutex<Vec<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<TransportRequest>>,
    }

    impl RecordingTransport {
        fn scripted(outcomes: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: &TransportRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.len() > 1 {
                outcomes.remove(0)
            } else {
                outcomes[0].clone()
            }
        }
    }

    fn config() -> PowoConfig {
        PowoConfig::builder()
            .base_url("https://example.test/api/2")
            .user_agent("test-agent")
            .backoff_base(Duration::ZERO)
            .backoff_max(Duration::ZERO)
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_headers() {
        let client = HttpClient::new(&config()).unwrap();
        let headers = client.default_headers();

        assert!(headers.contains(&("Accept".to_string(), "application/json".to_string())));
        assert!(headers.contains(&("User-Agent".to_string(), "test-agent".to_string())));
    }

    #[test]
    fn test_cache_key_includes_version_and_resolved_url() {
        let client = HttpClient::new(&config()).unwrap();
        let params = json!({"q": "Acacia"});
        let key = client.cache_key(HttpMethod::Get, "/search", params.as_object().unwrap());

        assert_eq!(
            key,
            format!("powo_api v={SDK_VERSION} GET https://example.test/api/2/search?q=Acacia")
        );
    }

    #[tokio::test]
    async fn test_request_resolves_url_and_flattens_query() {
        let transport = RecordingTransport::scripted(vec![Ok(HttpResponse::new(200, "{}"))]);
        let client = HttpClient::with_transport(&config(), transport.clone());

        let params = json!({"q": "a b", "tag": ["x", "y"], "skip": null});
        client
            .get("//search", params.as_object().unwrap())
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].url, "https://example.test/api/2/search");
        assert_eq!(
            seen[0].query,
            vec![
                ("q".to_string(), "a b".to_string()),
                ("tag".to_string(), "x".to_string()),
                ("tag".to_string(), "y".to_string()),
            ]
        );
        assert_eq!(seen[0].header("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_typed_failure_without_retry() {
        let transport = RecordingTransport::scripted(vec![Err(TransportError::Timeout(
            "deadline".to_string(),
        ))]);
        let client = HttpClient::with_transport(&config(), transport.clone());

        let error = client.get("search", &Params::new()).await.unwrap_err();

        assert_eq!(error.kind, FailureKind::Timeout);
        assert_eq!(error.status, None);
        assert_eq!(error.url, "https://example.test/api/2/search");
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_maps_to_connection_failed() {
        let transport = RecordingTransport::scripted(vec![Err(TransportError::Connect(
            "refused".to_string(),
        ))]);
        let client = HttpClient::with_transport(&config(), transport);

        let error = client.get("search", &Params::new()).await.unwrap_err();
        assert_eq!(error.kind, FailureKind::ConnectionFailed);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_until_success() {
        let transport = RecordingTransport::scripted(vec![
            Ok(HttpResponse::new(503, "")),
            Ok(HttpResponse::new(502, "")),
            Ok(HttpResponse::new(200, r#"{"ok":true}"#)),
        ]);
        let client = HttpClient::with_transport(&config(), transport.clone());

        let body = client.get("search", &Params::new()).await.unwrap();

        assert_eq!(body, json!({"ok": true}));
        assert_eq!(transport.seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpClient>();
    }
}
