//! Endpoint wrappers for POWO API version 2.
//!
//! # Available Resources
//!
//! ## Search
//!
//! - [`Search`] - Free-text and structured search over `/search`
//! - [`SearchQuery`] - A free-text query with filters, cursor and page size
//!
//! Search results are cursor-paged. Use [`Search::each`] or
//! [`Search::advanced_each`] to walk every page.
//!
//! ## Taxa
//!
//! - [`Taxa`] - Single taxon lookup over `/taxon/{id}`

mod search;
mod taxa;

pub use search::{Search, SearchQuery, DEFAULT_CURSOR, DEFAULT_PER_PAGE};
pub use taxa::Taxa;
