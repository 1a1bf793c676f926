//! Install outcome types for the precache populator

use thiserror::Error;
use url::Url;

use crate::fetcher::FetchError;
use crate::manifest::ManifestError;
use crate::store::StoreError;

/// Errors that can fail an install attempt
///
/// Every variant is fatal for the attempt as a whole: nothing from the
/// batch is committed and the worker stays in the installing state. The
/// caller is expected to retry the entire install, not individual assets.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The worker already completed an install in this lifecycle
    #[error("Install already completed; worker is ready")]
    AlreadyInstalled,

    /// A manifest entry could not be resolved against the scope
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A manifest URL could not be fetched at all
    #[error("Failed to fetch '{url}' during install: {source}")]
    FetchFailed {
        url: Url,
        #[source]
        source: FetchError,
    },

    /// A manifest URL answered with a non-success status
    #[error("Precache fetch for '{url}' returned status {status}")]
    BadStatus { url: Url, status: u16 },

    /// Committing the batch to the cache store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Resume was requested but no committed store exists
    #[error("No committed cache store named '{0}'; run install first")]
    NotInstalled(String),
}

/// Summary of a successful install
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Version tag of the store that was populated
    pub cache_name: String,
    /// Number of manifest entries committed
    pub entries: usize,
    /// Superseded store tags deleted during activation
    pub purged: Vec<String>,
}
