//! Asset manifest and cache version tag for the EOS solver deployment
//!
//! The manifest is the fixed, ordered list of URLs that must be available
//! offline. It is compiled in and immutable at runtime; each deployed
//! revision of the list should ship under a distinct cache version tag so
//! that stale stores can be told apart from the current one.

use thiserror::Error;
use url::Url;

/// Version tag naming the cache store for the current deployment
pub const CACHE_NAME: &str = "eos-solver-v1";

/// URLs precached at install time for the EOS solver app
///
/// Entries are either relative to the worker's scope (the app shell and
/// its descriptors) or absolute CDN URLs (the Pico CSS framework and the
/// Pyodide runtime bundle the solver runs on).
pub const PRECACHE_URLS: &[&str] = &[
    "./",
    "./index.html",
    "./manifest.json",
    "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css",
    "https://cdn.jsdelivr.net/pyodide/v0.25.0/full/pyodide.js",
    "https://cdn.jsdelivr.net/pyodide/v0.25.0/full/pyodide.asm.js",
    "https://cdn.jsdelivr.net/pyodide/v0.25.0/full/pyodide.asm.wasm",
    "https://cdn.jsdelivr.net/pyodide/v0.25.0/full/pyodide-lock.json",
];

/// Errors that can occur when resolving manifest entries
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A manifest entry could not be resolved against the worker scope
    #[error("Invalid manifest entry '{entry}': {source}")]
    InvalidEntry {
        entry: String,
        #[source]
        source: url::ParseError,
    },
}

/// The ordered list of asset URLs required for offline operation
///
/// Entries may be absolute or relative to the worker's scope. The list is
/// fixed at construction time; the core logic treats it as an opaque
/// sequence of strings.
#[derive(Debug, Clone)]
pub struct Manifest {
    entries: Vec<String>,
}

impl Manifest {
    /// Creates a manifest from an explicit list of URL strings
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Returns the compiled-in manifest for the EOS solver deployment
    pub fn standard() -> Self {
        Self::new(PRECACHE_URLS.iter().map(|url| url.to_string()).collect())
    }

    /// Returns the number of entries in the manifest
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the manifest has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the raw entry strings in manifest order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Resolves every entry against the worker's scope URL
    ///
    /// Relative entries are joined onto the scope; absolute entries pass
    /// through unchanged. Order is preserved.
    ///
    /// # Arguments
    /// * `scope` - The worker's scope URL (should end with a slash)
    ///
    /// # Returns
    /// * `Ok(Vec<Url>)` with one URL per manifest entry
    /// * `Err(ManifestError)` if any entry cannot be resolved
    pub fn resolve(&self, scope: &Url) -> Result<Vec<Url>, ManifestError> {
        self.entries
            .iter()
            .map(|entry| {
                scope.join(entry).map_err(|source| ManifestError::InvalidEntry {
                    entry: entry.clone(),
                    source,
                })
            })
            .collect()
    }
}
