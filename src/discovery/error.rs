//! Error types for link discovery.
//!
//! Only failures that make the whole run pointless are errors here; a species
//! or year page that cannot be loaded is logged and skipped instead.

use thiserror::Error;

use crate::download::DownloadError;

/// Errors that abort discovery before any download is attempted.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The collection root URL could not be parsed.
    #[error("invalid root URL {url}: {source}")]
    InvalidRootUrl {
        /// The rejected URL.
        url: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The collection root page could not be fetched.
    #[error("cannot load root page {url}: {source}")]
    RootPage {
        /// The root page URL.
        url: String,
        /// The underlying fetch error.
        #[source]
        source: DownloadError,
    },

    /// The root page has no species dropdown.
    #[error("no species list found on {url}")]
    MissingSpeciesList {
        /// The root page URL.
        url: String,
    },
}
