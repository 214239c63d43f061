//! Error types for endpoint wrappers.
//!
//! Endpoint wrappers validate caller input before anything is sent, so they
//! can fail in two ways: a [`ValidationError`] raised locally, or a
//! [`RequestError`] from the round-trip. [`ResourceError`] is the union.
//!
//! # Example
//!
//! ```rust,ignore
//! use powo_api::rest::{ResourceError, ValidationError};
//!
//! match client.search().query(&SearchQuery::new("Acacia")).await {
//!     Ok(response) => println!("{} results", response.results().len()),
//!     Err(ResourceError::Validation(ValidationError::UnsupportedParams { unknown, .. })) => {
//!         println!("drop these: {unknown:?}");
//!     }
//!     Err(ResourceError::Request(e)) if e.is_retryable() => println!("try later"),
//!     Err(e) => println!("failed: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::{FailureKind, RequestError};

/// Caller input that was rejected before any request was made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required value is missing or blank.
    #[error("{name} must be provided")]
    Missing {
        /// The parameter name.
        name: String,
    },

    /// A value must be a JSON object.
    #[error("{name} must be an object")]
    NotObject {
        /// The parameter name.
        name: String,
    },

    /// A value must be `true` or `false`.
    #[error("{name} must be boolean (true/false)")]
    NotBoolean {
        /// The parameter name.
        name: String,
    },

    /// A value must be an integer or an integer string.
    #[error("{name} must be an integer")]
    NotInteger {
        /// The parameter name.
        name: String,
    },

    /// One or more parameter names are outside the active allow-list.
    #[error("Unsupported parameter(s): {}. Supported: [{}]", unknown.join(", "), supported.join(", "))]
    UnsupportedParams {
        /// The rejected names, in input order.
        unknown: Vec<String>,
        /// Every accepted name, sorted.
        supported: Vec<String>,
    },

    /// Search results are paged by cursor only.
    #[error("POWO search no longer supports page-based pagination. Remove `page` and use `cursor` instead.")]
    PagePagination,
}

/// Error type for endpoint operations.
#[derive(Debug, Error, Clone)]
pub enum ResourceError {
    /// The input was rejected locally.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request failed.
    #[error(transparent)]
    Request(#[from] RequestError),
}

impl ResourceError {
    /// Returns the failure kind when the request itself failed.
    #[must_use]
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Validation(_) => None,
            Self::Request(e) => Some(e.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;

    #[test]
    fn test_missing_message() {
        let error = ValidationError::Missing {
            name: "query".to_string(),
        };
        assert_eq!(error.to_string(), "query must be provided");
    }

    #[test]
    fn test_type_messages() {
        assert_eq!(
            ValidationError::NotObject { name: "params".to_string() }.to_string(),
            "params must be an object"
        );
        assert_eq!(
            ValidationError::NotBoolean { name: "images".to_string() }.to_string(),
            "images must be boolean (true/false)"
        );
    }

    #[test]
    fn test_unsupported_params_lists_both_sides() {
        let error = ValidationError::UnsupportedParams {
            unknown: vec!["colour".to_string()],
            supported: vec!["accepted".to_string(), "family".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Unsupported parameter(s): colour. Supported: [accepted, family]"
        );
    }

    #[test]
    fn test_page_pagination_points_to_cursor() {
        let message = ValidationError::PagePagination.to_string();
        assert!(message.contains("page-based pagination"));
        assert!(message.contains("`cursor`"));
    }

    #[test]
    fn test_resource_error_conversions() {
        let error: ResourceError = ValidationError::PagePagination.into();
        assert_eq!(error.failure_kind(), None);

        let error: ResourceError =
            RequestError::timeout(HttpMethod::Get, "https://example.test", "slow").into();
        assert_eq!(error.failure_kind(), Some(FailureKind::Timeout));
        assert!(error.to_string().contains("timed out"));
    }
}
