//! HTTP client types for POWO API communication.
//!
//! This module provides the request layer between endpoint wrappers and
//! the network. It derives cache keys, consults the cache, retries
//! transient failures and classifies raw responses into typed outcomes.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: The request executor
//! - [`CacheKeyBuilder`]: Deterministic cache keys from method, URL and parameters
//! - [`CacheStore`]: Memoization through a pluggable [`CacheAdapter`]
//! - [`ResponseClassifier`]: Maps an [`HttpResponse`] to a payload or a [`RequestError`]
//! - [`RetryPolicy`]: Bounded retry with exponential backoff
//! - [`Transport`]: The network capability, [`ReqwestTransport`] by default
//! - [`powo::PowoClient`]: Higher-level client exposing the endpoint wrappers
//!
//! # Request Flow
//!
//! ```text
//! HttpClient::request(method, path, params)
//!   -> CacheKeyBuilder::build
//!   -> CacheStore::fetch(key) {
//!        RetryPolicy::with_retry {
//!          Transport::send -> ResponseClassifier::classify
//!        }
//!      }
//! ```
//!
//! # Retry Behavior
//!
//! - **429 (Rate Limited)**: Retries after the `Retry-After` value, or with backoff if absent
//! - **5xx (Server Error)**: Retries with exponential backoff and jitter
//! - **Other failures**: Returned immediately without retry
//!
//! The default is 3 retries, configurable via
//! [`PowoConfigBuilder::max_retries`](crate::config::PowoConfigBuilder::max_retries).

mod cache_key;
mod cache_store;
mod errors;
mod http_client;
mod http_request;
mod http_response;
pub mod powo;
mod response_classifier;
mod retry_policy;
mod transport;

pub use cache_key::{encode_query, flatten_params, CacheKeyBuilder, Params, CACHE_KEY_TAG};
pub use cache_store::{
    CacheAdapter, CacheOptions, CacheStore, ComputeFuture, MemoryCache, NoCache,
};
pub use errors::{FailureKind, RequestError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, TransportRequest};
pub use http_response::{HttpResponse, ResponseBody};
pub use response_classifier::ResponseClassifier;
pub use retry_policy::{RetryPolicy, MAX_JITTER_SECS};
pub use transport::{ReqwestTransport, Transport, TransportError};

// Re-export the high-level client at the clients module level
pub use powo::PowoClient;
