//! Endpoint layer for the POWO API.
//!
//! This module sits on top of [`HttpClient`](crate::HttpClient) and provides:
//!
//! - **Endpoint wrappers**: [`Search`] and [`Taxa`], which validate caller
//!   input before a request is made
//! - **[`Response`]**: a schema-tolerant view over parsed JSON
//! - **[`Paginator`]**: a lazy, pull-based sequence of rows over pages
//! - **[`Terms`]**: parameter allow-lists for POWO and IPNI
//! - **Path building** with per-segment escaping
//! - **[`ResourceError`]**: the union of validation and request failures
//!
//! # Example
//!
//! ```rust,ignore
//! use powo_api::{PowoClient, PowoConfig};
//! use powo_api::rest::SearchQuery;
//!
//! let client = PowoClient::powo(&PowoConfig::builder().build()?)?;
//!
//! // One page
//! let response = client.search().query(&SearchQuery::new("Acacia")).await?;
//! println!("{:?} matches", response.total_count());
//!
//! // Every row, fetched lazily
//! let mut rows = client.search().each(SearchQuery::new("Acacia").per_page(100));
//! while let Some(row) = rows.next().await {
//!     println!("{}", row?["name"]);
//! }
//! ```

mod errors;
mod paginator;
mod path;
mod response;
mod terms;

pub mod resources;
pub mod validation;

// Public exports
pub use errors::{ResourceError, ValidationError};
pub use paginator::{Page, Paginator};
pub use path::{build_path, escape_path_segment, ResourcePath, SEARCH_PATH, TAXON_PATH};
pub use resources::{Search, SearchQuery, Taxa, DEFAULT_CURSOR, DEFAULT_PER_PAGE};
pub use response::{Response, TERMINAL_CURSOR};
pub use terms::Terms;
