//! Deterministic cache keys and query flattening.
//!
//! Parameters are flattened the same way for the cache key and for the
//! query string actually sent, so two structurally equal parameter sets
//! always share one cache entry and one wire request.

use serde_json::{Map, Value};
use url::form_urlencoded::byte_serialize;

use crate::clients::http_request::HttpMethod;

/// Request parameters: string keys mapped to scalars, arrays or nested objects.
pub type Params = Map<String, Value>;

/// Literal prefix identifying keys written by this client.
pub const CACHE_KEY_TAG: &str = "powo_api";

/// Builds cache keys of the form
/// `powo_api ns=<namespace> v=<version> <METHOD> <url>?<query>`.
///
/// The namespace and version segments are omitted when blank, and the
/// `?<query>` suffix when there are no parameters.
///
/// # Example
///
/// ```rust
/// use powo_api::{CacheKeyBuilder, HttpMethod};
/// use serde_json::json;
///
/// let builder = CacheKeyBuilder::new(Some("herbarium"), "1.2.0");
/// let params = json!({ "b": 2, "a": 1 });
///
/// assert_eq!(
///     builder.build(HttpMethod::Get, "https://example.test/search", params.as_object().unwrap()),
///     "powo_api ns=herbarium v=1.2.0 GET https://example.test/search?a=1&b=2"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheKeyBuilder {
    namespace: Option<String>,
    version: Option<String>,
}

impl CacheKeyBuilder {
    /// Creates a builder with an optional namespace and a version tag.
    #[must_use]
    pub fn new(namespace: Option<&str>, version: &str) -> Self {
        Self {
            namespace: non_blank(namespace),
            version: non_blank(Some(version)),
        }
    }

    /// Derives the cache key for one request.
    #[must_use]
    pub fn build(&self, method: HttpMethod, url: &str, params: &Params) -> String {
        let mut key = String::from(CACHE_KEY_TAG);
        if let Some(namespace) = &self.namespace {
            key.push_str(&format!(" ns={namespace}"));
        }
        if let Some(version) = &self.version {
            key.push_str(&format!(" v={version}"));
        }
        key.push_str(&format!(" {method} {url}"));

        let query = encode_query(&flatten_params(params));
        if !query.is_empty() {
            key.push('?');
            key.push_str(&query);
        }
        key
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Flattens parameters into ordered key/value pairs.
///
/// Object keys are sorted; nested objects become `outer[inner]` keys and
/// arrays become repeated keys in their original order. Nulls contribute
/// nothing.
///
/// # Example
///
/// ```rust
/// use powo_api::clients::flatten_params;
/// use serde_json::json;
///
/// let params = json!({ "tag": ["a", "b"], "geo": { "region": "Asia" } });
/// let pairs = flatten_params(params.as_object().unwrap());
///
/// assert_eq!(pairs, vec![
///     ("geo[region]".to_string(), "Asia".to_string()),
///     ("tag".to_string(), "a".to_string()),
///     ("tag".to_string(), "b".to_string()),
/// ]);
/// ```
#[must_use]
pub fn flatten_params(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    flatten_object(None, params, &mut pairs);
    pairs
}

fn flatten_object(prefix: Option<&str>, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    for key in keys {
        let path = match prefix {
            Some(prefix) => format!("{prefix}[{key}]"),
            None => key.clone(),
        };
        flatten_value(Some(&path), &map[key.as_str()], out);
    }
}

fn flatten_value(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => flatten_object(prefix, map, out),
        Value::Array(items) => {
            for item in items {
                flatten_value(prefix, item, out);
            }
        }
        Value::Null => {}
        scalar => {
            // A bare value with no key cannot be encoded.
            if let Some(key) = prefix {
                out.push((key.to_string(), scalar_to_string(scalar)));
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Encodes pairs as an `application/x-www-form-urlencoded` query string.
#[must_use]
pub fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                byte_serialize(key.as_bytes()).collect::<String>(),
                byte_serialize(value.as_bytes()).collect::<String>()
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
