//! # POWO API Rust Client
//!
//! A Rust client for the Plants of the World Online (POWO) REST API and its
//! IPNI search vocabulary, providing validated configuration, resilient
//! request execution and lazy pagination.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`PowoConfig`] and [`PowoConfigBuilder`]
//! - Validated newtypes for the base URL and user agent
//! - Deterministic cache keys and a pluggable cache via [`CacheAdapter`]
//! - Automatic retry of rate-limited and server-error responses, honoring `Retry-After`
//! - Typed failures that can be discriminated by [`FailureKind`]
//! - Input validation against the POWO or IPNI parameter allow-list
//! - Lazy cursor pagination via [`rest::Paginator`]
//!
//! ## Quick Start
//!
//! ```rust
//! use powo_api::{PowoConfig, PowoClient};
//! use std::time::Duration;
//!
//! let config = PowoConfig::builder()
//!     .user_agent("my-herbarium/1.0")
//!     .timeout(Duration::from_secs(5))
//!     .max_retries(2)
//!     .build()
//!     .unwrap();
//!
//! let client = PowoClient::powo(&config).unwrap();
//! assert!(client.allowed_params().contains("genus"));
//! ```
//!
//! ## Searching
//!
//! ```rust,ignore
//! use powo_api::rest::SearchQuery;
//!
//! let response = client
//!     .search()
//!     .query(&SearchQuery::new("Acacia").filter("accepted", true).filter("images", true))
//!     .await?;
//!
//! for row in response.results() {
//!     println!("{}", row["name"]);
//! }
//! ```
//!
//! ## Pagination
//!
//! ```rust,ignore
//! let mut rows = client.search().each(SearchQuery::new("Acacia"));
//! while let Some(row) = rows.next().await {
//!     println!("{}", row?["fqId"]);
//! }
//! ```
//!
//! ## Caching
//!
//! ```rust,ignore
//! use powo_api::{CacheOptions, MemoryCache, PowoConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = PowoConfig::builder()
//!     .cache(Arc::new(MemoryCache::new(10_000)))
//!     .cache_options(CacheOptions { expires_in: Some(Duration::from_secs(3600)) })
//!     .cache_namespace("herbarium")
//!     .build()?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Clients are instance-based and passed explicitly
//! - **Fail-fast validation**: Newtypes and endpoint inputs validate before any request
//! - **Thread-safe**: Clients are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{
    BaseUrl, CacheOptionsOverride, ClientMode, ConfigOverrides, PowoConfig, PowoConfigBuilder,
    UserAgent,
};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    CacheAdapter, CacheKeyBuilder, CacheOptions, ComputeFuture, FailureKind, HttpClient,
    HttpMethod, HttpResponse, MemoryCache, NoCache, Params, PowoClient, RequestError,
    ResponseBody, ResponseClassifier, RetryPolicy, Transport, TransportError, TransportRequest,
};
