//! Resolution outcome types for the cache-first request path

use std::fmt;
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::store::StoreError;
use crate::worker::WorkerState;

/// Errors that can occur while resolving a request
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The worker has not reached the ready state
    #[error("Worker is not ready to serve requests (state: {0})")]
    NotReady(WorkerState),

    /// Reading the cache stores failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The fallback network fetch failed; surfaced to the caller unchanged
    #[error(transparent)]
    Network(#[from] FetchError),

    /// The request key does not hold a parseable URL
    #[error("Request key holds an invalid URL: {0}")]
    InvalidKeyUrl(String),
}

/// Where a resolved response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Served from a cache store without touching the network
    Cache,
    /// Served by a live network fetch after a cache miss
    Network,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::Cache => write!(f, "cache"),
            ResponseSource::Network => write!(f, "network"),
        }
    }
}

/// The single response produced for one resolved request
#[derive(Debug, Clone)]
pub struct Resolution {
    /// HTTP status code of the response
    pub status: u16,
    /// Response headers in stored or arrival order
    pub headers: Vec<(String, String)>,
    /// Raw body bytes
    pub body: Vec<u8>,
    /// Whether the response came from cache or the network
    pub source: ResponseSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display_names() {
        assert_eq!(ResponseSource::Cache.to_string(), "cache");
        assert_eq!(ResponseSource::Network.to_string(), "network");
    }
}
