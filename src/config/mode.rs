//! Client mode definitions.
//!
//! This module provides the [`ClientMode`] enum, which selects the search
//! vocabulary a client validates against. Both modes call the same POWO
//! endpoints; they differ only in the allowed parameter names and in which
//! top-level keys are treated as parameter groups.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Which search vocabulary a client accepts.
///
/// # Example
///
/// ```rust
/// use powo_api::ClientMode;
///
/// let mode: ClientMode = "ipni".parse().unwrap();
/// assert_eq!(mode, ClientMode::Ipni);
/// assert_eq!(mode.to_string(), "ipni");
/// assert_eq!(ClientMode::default(), ClientMode::Powo);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClientMode {
    /// Plants of the World Online name, characteristic and geography terms.
    #[default]
    Powo,
    /// International Plant Names Index name, author and publication terms.
    Ipni,
}

impl ClientMode {
    /// Returns the mode name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Powo => "powo",
            Self::Ipni => "ipni",
        }
    }

    /// Returns the top-level keys that hold grouped parameter objects.
    ///
    /// An advanced search may pass `{"name": {"genus": "Acacia"}}`; keys
    /// listed here are flattened into their members before validation.
    #[must_use]
    pub const fn group_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Powo => &["name", "characteristic", "geography"],
            Self::Ipni => &["name", "author", "publication"],
        }
    }
}

impl fmt::Display for ClientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "powo" => Ok(Self::Powo),
            "ipni" => Ok(Self::Ipni),
            _ => Err(ConfigError::UnknownClientMode {
                mode: s.to_string(),
            }),
        }
    }
}
