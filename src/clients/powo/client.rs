//! The [`PowoClient`] type.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::clients::{HttpClient, Transport};
use crate::config::{ClientMode, PowoConfig};
use crate::error::ConfigError;
use crate::rest::{Search, Taxa, Terms};

/// Client for one POWO vocabulary mode.
///
/// The allow-list is loaded once at construction, from the configured
/// terms file or the built-in lists.
///
/// # Thread Safety
///
/// `PowoClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust
/// use powo_api::{ClientMode, PowoClient, PowoConfig};
///
/// let config = PowoConfig::builder().build().unwrap();
/// let client = PowoClient::ipni(&config).unwrap();
///
/// assert_eq!(client.mode(), ClientMode::Ipni);
/// assert!(client.allowed_params().contains("standard_form"));
/// ```
#[derive(Clone, Debug)]
pub struct PowoClient {
    http_client: HttpClient,
    mode: ClientMode,
    allowed_params: BTreeSet<String>,
}

// Verify PowoClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PowoClient>();
};

impl PowoClient {
    /// Creates a client for `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP stack cannot be
    /// initialized.
    pub fn new(config: &PowoConfig, mode: ClientMode) -> Result<Self, ConfigError> {
        let http_client = HttpClient::new(config)?;
        Ok(Self::from_parts(config, mode, http_client))
    }

    /// Creates a client using the POWO vocabulary.
    ///
    /// # Errors
    ///
    /// See [`PowoClient::new`].
    pub fn powo(config: &PowoConfig) -> Result<Self, ConfigError> {
        Self::new(config, ClientMode::Powo)
    }

    /// Creates a client using the IPNI vocabulary.
    ///
    /// # Errors
    ///
    /// See [`PowoClient::new`].
    pub fn ipni(config: &PowoConfig) -> Result<Self, ConfigError> {
        Self::new(config, ClientMode::Ipni)
    }

    /// Creates a client that sends requests through `transport`.
    #[must_use]
    pub fn with_transport(
        config: &PowoConfig,
        mode: ClientMode,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let http_client = HttpClient::with_transport(config, transport);
        Self::from_parts(config, mode, http_client)
    }

    fn from_parts(config: &PowoConfig, mode: ClientMode, http_client: HttpClient) -> Self {
        let terms = Terms::load(config.terms_path());
        let allowed_params = terms.allowed_params(mode);
        tracing::debug!(
            mode = %mode,
            terms = allowed_params.len(),
            "Created POWO client"
        );

        Self {
            http_client,
            mode,
            allowed_params,
        }
    }

    /// Returns the `/search` wrapper.
    #[must_use]
    pub const fn search(&self) -> Search<'_> {
        Search::new(&self.http_client, &self.allowed_params, self.mode.group_keys())
    }

    /// Returns the `/taxon` wrapper.
    #[must_use]
    pub const fn taxa(&self) -> Taxa<'_> {
        Taxa::new(&self.http_client)
    }

    /// Returns the underlying request executor.
    #[must_use]
    pub const fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Returns the vocabulary mode.
    #[must_use]
    pub const fn mode(&self) -> ClientMode {
        self.mode
    }

    /// Returns the accepted search parameter names.
    #[must_use]
    pub const fn allowed_params(&self) -> &BTreeSet<String> {
        &self.allowed_params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_select_allow_lists() {
        let config = PowoConfig::builder().build().unwrap();

        let powo = PowoClient::powo(&config).unwrap();
        let ipni = PowoClient::ipni(&config).unwrap();

        assert_eq!(powo.mode(), ClientMode::Powo);
        assert!(powo.allowed_params().contains("native_distribution"));
        assert!(!ipni.allowed_params().contains("native_distribution"));
        assert!(ipni.allowed_params().contains("publication_title"));
    }

    #[test]
    fn test_client_uses_configured_base_url() {
        let config = PowoConfig::builder()
            .base_url("https://example.org/powo/api/2")
            .build()
            .unwrap();
        let client = PowoClient::new(&config, ClientMode::Powo).unwrap();

        assert_eq!(
            client.http_client().base_url().as_ref(),
            "https://example.org/powo/api/2/"
        );
    }
}
