//! Cache adapters and the store the executor consults.
//!
//! A [`CacheAdapter`] has a single compute-on-miss entry point. The
//! [`CacheStore`] wraps whichever adapter is configured, falling back to
//! [`NoCache`] so the executor never has to branch on "is there a cache".

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde_json::Value;

use crate::clients::errors::RequestError;

/// The work to run on a cache miss.
pub type ComputeFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, RequestError>> + Send + 'a>>;

/// Options passed to the adapter on every fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// How long a stored entry stays fresh. `None` keeps it until evicted.
    pub expires_in: Option<Duration>,
}

/// A key/value cache with compute-on-miss semantics.
///
/// Implementations must await `compute` at most once per call and must not
/// store failures. Whether concurrent misses for one key are coalesced is
/// up to the implementation.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use powo_api::{CacheAdapter, CacheOptions, ComputeFuture, RequestError};
/// use serde_json::Value;
///
/// #[derive(Debug)]
/// struct Passthrough;
///
/// #[async_trait]
/// impl CacheAdapter for Passthrough {
///     async fn fetch(
///         &self,
///         _key: &str,
///         _options: &CacheOptions,
///         compute: ComputeFuture<'_>,
///     ) -> Result<Value, RequestError> {
///         compute.await
///     }
/// }
/// ```
#[async_trait]
pub trait CacheAdapter: Send + Sync + fmt::Debug {
    /// Returns the cached value for `key`, or runs `compute` and stores its success.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `compute` on a miss.
    async fn fetch(
        &self,
        key: &str,
        options: &CacheOptions,
        compute: ComputeFuture<'_>,
    ) -> Result<Value, RequestError>;
}

/// An adapter that never stores anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCache;

#[async_trait]
impl CacheAdapter for NoCache {
    async fn fetch(
        &self,
        _key: &str,
        _options: &CacheOptions,
        compute: ComputeFuture<'_>,
    ) -> Result<Value, RequestError> {
        compute.await
    }
}

#[derive(Clone)]
struct CachedValue {
    value: Value,
    ttl: Option<Duration>,
}

struct EntryTtl;

impl Expiry<String, CachedValue> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// An in-process cache backed by `moka`.
///
/// Concurrent misses for the same key share one computation. Each entry
/// lives for the `expires_in` given when it was stored.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use powo_api::{MemoryCache, PowoConfig};
///
/// let config = PowoConfig::builder()
///     .cache(Arc::new(MemoryCache::new(1_000)))
///     .build()
///     .unwrap();
/// assert!(config.cache().is_some());
/// ```
#[derive(Clone)]
pub struct MemoryCache {
    cache: Cache<String, CachedValue>,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_capacity` entries.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();
        Self { cache }
    }

    /// Returns the approximate number of stored entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl CacheAdapter for MemoryCache {
    async fn fetch(
        &self,
        key: &str,
        options: &CacheOptions,
        compute: ComputeFuture<'_>,
    ) -> Result<Value, RequestError> {
        let ttl = options.expires_in;
        self.cache
            .try_get_with(key.to_string(), async move {
                compute.await.map(|value| CachedValue { value, ttl })
            })
            .await
            .map(|cached| cached.value)
            .map_err(|shared| Arc::try_unwrap(shared).unwrap_or_else(|e| (*e).clone()))
    }
}

/// The executor's view of the configured cache.
#[derive(Clone, Debug)]
pub struct CacheStore {
    adapter: Arc<dyn CacheAdapter>,
    options: CacheOptions,
}

impl CacheStore {
    /// Wraps `adapter`, or [`NoCache`] when none is configured.
    #[must_use]
    pub fn new(adapter: Option<Arc<dyn CacheAdapter>>, options: CacheOptions) -> Self {
        Self {
            adapter: adapter.unwrap_or_else(|| Arc::new(NoCache)),
            options,
        }
    }

    /// Returns the cached value for `key` or runs `compute`.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `compute` on a miss.
    pub async fn fetch(&self, key: &str, compute: ComputeFuture<'_>) -> Result<Value, RequestError> {
        tracing::debug!(cache_key = key, "Fetching through cache");
        self.adapter.fetch(key, &self.options, compute).await
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(None, CacheOptions::default())
    }
}
