//! Schema-tolerant wrapper around parsed POWO responses.
//!
//! POWO's JSON schema is not formally documented and varies between
//! endpoints, so every accessor here is a best-effort lookup that returns
//! an empty or absent value rather than failing.
//!
//! # Pagination
//!
//! Two styles are recognized:
//!
//! - `page` / `totalPages` (or `pages`): more pages exist while `page < totalPages`
//! - `cursor`: more pages exist while the cursor is non-empty and not `"*"`
//!
//! When both are present, the page metadata wins. This is a detection
//! heuristic over the payload, not a guarantee made by the service.
//!
//! # Example
//!
//! ```rust
//! use powo_api::rest::Response;
//! use serde_json::json;
//!
//! let response = Response::new(json!({
//!     "totalResults": 2,
//!     "cursor": "AoE=",
//!     "results": [{"name": "Acacia"}, {"name": "Acer"}]
//! }));
//!
//! assert_eq!(response.results().len(), 2);
//! assert_eq!(response.total_count(), Some(2));
//! assert!(response.has_next_page());
//! ```

use serde_json::Value;

use crate::rest::paginator::Page;

/// Sentinel cursor meaning "first page" in requests and "no more pages" in responses.
pub const TERMINAL_CURSOR: &str = "*";

/// A parsed POWO response.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    raw: Value,
}

impl Response {
    /// Wraps a parsed JSON value.
    #[must_use]
    pub const fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Returns the underlying JSON.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consumes the wrapper, returning the underlying JSON.
    #[must_use]
    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Returns the `results` rows, or an empty slice when absent or not an array.
    #[must_use]
    pub fn results(&self) -> &[Value] {
        match self.raw.get("results") {
            Some(Value::Array(rows)) => rows,
            _ => &[],
        }
    }

    /// Consumes the wrapper, returning the `results` rows.
    #[must_use]
    pub fn into_results(self) -> Vec<Value> {
        match self.raw {
            Value::Object(mut map) => match map.remove("results") {
                Some(Value::Array(rows)) => rows,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Returns `totalResults`, falling back to `total`.
    #[must_use]
    pub fn total_count(&self) -> Option<u64> {
        self.field("totalResults")
            .or_else(|| self.field("total"))
            .and_then(as_integer)
            .and_then(|n| u64::try_from(n).ok())
    }

    /// Returns the current page number, when the response is page-based.
    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.field("page").and_then(as_integer)
    }

    /// Returns `totalPages`, falling back to `pages`.
    #[must_use]
    pub fn total_pages(&self) -> Option<i64> {
        self.field("totalPages")
            .or_else(|| self.field("pages"))
            .and_then(as_integer)
    }

    /// Returns the `cursor` for the next page, as sent by the server.
    #[must_use]
    pub fn cursor(&self) -> Option<String> {
        match self.field("cursor")? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Returns `true` if the response indicates another page.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        let page = self.field("page");
        let total_pages = self.field("totalPages").or_else(|| self.field("pages"));

        if let (Some(page), Some(total_pages)) = (page, total_pages) {
            return as_integer(page).unwrap_or(0) < as_integer(total_pages).unwrap_or(0);
        }

        self.cursor()
            .is_some_and(|cursor| !cursor.is_empty() && cursor != TERMINAL_CURSOR)
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.raw.get(key).filter(|value| !value.is_null())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Page for Response {
    type Row = Value;

    fn has_next_page(&self) -> bool {
        Self::has_next_page(self)
    }

    fn next_cursor(&self) -> Option<String> {
        self.cursor()
    }

    fn into_rows(self) -> Vec<Value> {
        self.into_results()
    }
}

impl From<Value> for Response {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}
