//! The `/taxon/{id}` endpoint.

use crate::clients::{HttpClient, Params};
use crate::rest::errors::ResourceError;
use crate::rest::path::{build_path, TAXON_PATH};
use crate::rest::response::Response;
use crate::rest::validation;

/// Endpoint wrapper for taxon lookups.
///
/// Obtained from [`PowoClient::taxa`](crate::PowoClient::taxa).
#[derive(Clone, Copy, Debug)]
pub struct Taxa<'a> {
    http_client: &'a HttpClient,
}

impl<'a> Taxa<'a> {
    /// Creates a wrapper over `http_client`.
    #[must_use]
    pub const fn new(http_client: &'a HttpClient) -> Self {
        Self { http_client }
    }

    /// Fetches one taxon by its identifier, e.g. an IPNI LSID.
    ///
    /// The identifier is sent verbatim as a single escaped path segment, so
    /// an id containing `/` or `:` cannot alter the request path.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for a blank id and
    /// [`ResourceError::Request`] if the request fails.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let taxon = client
    ///     .taxa()
    ///     .lookup("urn:lsid:ipni.org:names:30001404-2")
    ///     .await?;
    /// println!("{}", taxon.raw()["name"]);
    /// ```
    pub async fn lookup(&self, id: &str) -> Result<Response, ResourceError> {
        validation::presence_str(id, "id")?;
        let path = build_path(TAXON_PATH.template, &[("id", id)]);

        let raw = self
            .http_client
            .request(TAXON_PATH.http_method, &path, &Params::new())
            .await?;
        Ok(Response::new(raw))
    }
}
