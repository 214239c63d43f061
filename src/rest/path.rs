//! Endpoint paths and path-segment escaping.
//!
//! Paths are templates relative to the configured base URL. Identifiers are
//! escaped as a single path segment before interpolation, so an LSID such
//! as `urn:lsid:ipni.org:names:30000618-2` cannot introduce extra segments
//! or query syntax.
//!
//! # Example
//!
//! ```rust
//! use powo_api::rest::{build_path, TAXON_PATH};
//!
//! let path = build_path(TAXON_PATH.template, &[("id", "urn:lsid:ipni.org:names:1-2")]);
//! assert_eq!(path, "taxon/urn%3Alsid%3Aipni.org%3Anames%3A1-2");
//! ```

use crate::clients::HttpMethod;

/// A POWO endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePath {
    /// The HTTP method for this path.
    pub http_method: HttpMethod,
    /// The path template with `{id}` placeholders.
    pub template: &'static str,
}

impl ResourcePath {
    /// Creates a new `ResourcePath`.
    #[must_use]
    pub const fn new(http_method: HttpMethod, template: &'static str) -> Self {
        Self {
            http_method,
            template,
        }
    }
}

/// `GET search`
pub const SEARCH_PATH: ResourcePath = ResourcePath::new(HttpMethod::Get, "search");

/// `GET taxon/{id}`
pub const TAXON_PATH: ResourcePath = ResourcePath::new(HttpMethod::Get, "taxon/{id}");

/// Escapes a value for use as one URL path segment.
///
/// Only the unreserved characters `A-Z a-z 0-9 - . _ ~` are left as is.
///
/// # Example
///
/// ```rust
/// use powo_api::rest::escape_path_segment;
///
/// assert_eq!(escape_path_segment("a/b c"), "a%2Fb%20c");
/// assert_eq!(escape_path_segment("safe-._~"), "safe-._~");
/// ```
#[must_use]
pub fn escape_path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Builds a path from a template, escaping each interpolated value.
#[must_use]
pub fn build_path(template: &str, ids: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in ids {
        let placeholder = format!("{{{key}}}");
        result = result.replace(&placeholder, &escape_path_segment(value));
    }

    result
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourcePath>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_path_stores_fields_correctly() {
        assert_eq!(TAXON_PATH.http_method, HttpMethod::Get);
        assert_eq!(TAXON_PATH.template, "taxon/{id}");
        assert_eq!(
            ResourcePath::new(HttpMethod::Get, "search"),
            SEARCH_PATH
        );
    }

    #[test]
    fn test_escape_keeps_unreserved_characters() {
        let unreserved = "ABCxyz019-._~";
        assert_eq!(escape_path_segment(unreserved), unreserved);
    }

    #[test]
    fn test_escape_reserved_characters() {
        assert_eq!(escape_path_segment("a:b"), "a%3Ab");
        assert_eq!(escape_path_segment("a/b"), "a%2Fb");
        assert_eq!(escape_path_segment("a?b#c"), "a%3Fb%23c");
        assert_eq!(escape_path_segment("a b"), "a%20b");
    }

    #[test]
    fn test_escape_utf8_bytes() {
        assert_eq!(escape_path_segment("é"), "%C3%A9");
    }

    #[test]
    fn test_build_path_interpolates_and_escapes() {
        assert_eq!(
            build_path("taxon/{id}", &[("id", "urn:lsid:ipni.org:names:30000618-2")]),
            "taxon/urn%3Alsid%3Aipni.org%3Anames%3A30000618-2"
        );
    }

    #[test]
    fn test_build_path_leaves_unknown_placeholders() {
        assert_eq!(build_path("taxon/{id}", &[]), "taxon/{id}");
    }
}
