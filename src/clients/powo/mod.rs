//! High-level client for the POWO and IPNI search APIs.
//!
//! [`PowoClient`] owns one [`HttpClient`](crate::clients::HttpClient) and
//! the parameter allow-list for its [`ClientMode`](crate::ClientMode), and
//! hands out borrowed endpoint wrappers.
//!
//! # Example
//!
//! ```rust,ignore
//! use powo_api::{PowoClient, PowoConfig};
//! use powo_api::rest::SearchQuery;
//!
//! let config = PowoConfig::builder()
//!     .user_agent("my-herbarium/1.0")
//!     .build()?;
//! let client = PowoClient::powo(&config)?;
//!
//! let response = client
//!     .search()
//!     .query(&SearchQuery::new("Acacia").filter("accepted", true))
//!     .await?;
//! ```

mod client;

pub use client::PowoClient;
