//! Version-specific endpoint wrappers.
//!
//! ```text
//! resources/
//!   mod.rs     <- This file (re-exports latest version)
//!   v2/
//!     mod.rs   <- Version-specific wrappers
//! ```
//!
//! The latest version is re-exported at this module level:
//!
//! ```rust,ignore
//! use powo_api::rest::resources::{Search, SearchQuery};
//!
//! // Or explicitly specify a version:
//! use powo_api::rest::resources::v2::Taxa;
//! ```
//!
//! Wrappers borrow the client's [`HttpClient`](crate::HttpClient) and are
//! normally obtained from [`PowoClient`](crate::PowoClient):
//!
//! ```rust,ignore
//! use powo_api::{ClientMode, PowoClient, PowoConfig};
//! use powo_api::rest::SearchQuery;
//!
//! let client = PowoClient::powo(&PowoConfig::builder().build()?)?;
//!
//! let response = client.search().query(&SearchQuery::new("Acacia")).await?;
//! let taxon = client.taxa().lookup("urn:lsid:ipni.org:names:30001404-2").await?;
//! ```

pub mod v2;

pub use v2::{Search, SearchQuery, Taxa, DEFAULT_CURSOR, DEFAULT_PER_PAGE};
