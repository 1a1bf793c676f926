//! Offline worker: precache populator and cache-first request resolver
//!
//! The worker owns the install-then-serve lifecycle. `install` downloads
//! every manifest URL concurrently and commits the whole batch into the
//! versioned cache store only if every fetch succeeded, then purges
//! superseded stores and becomes ready. `handle_fetch` answers each
//! request from cache when a match exists and falls back to exactly one
//! live network fetch otherwise, never writing the result back.

mod install;
mod resolve;
mod state;

pub use install::{InstallError, InstallReport};
pub use resolve::{Resolution, ResolveError, ResponseSource};
pub use state::WorkerState;

use futures::future::try_join_all;
use std::sync::{Arc, RwLock};
use url::Url;

use crate::fetcher::{FetchedResponse, Fetcher};
use crate::manifest::{Manifest, CACHE_NAME};
use crate::store::{CacheRegistry, RequestKey, StoredResponse};

/// Configuration for one worker lifecycle
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Version tag naming the store this deployment installs into
    pub cache_name: String,
    /// Scope URL that relative manifest entries resolve against
    pub scope: Url,
    /// The asset manifest to precache
    pub manifest: Manifest,
    /// Whether activation deletes stores with superseded version tags
    pub purge_stale_on_activate: bool,
}

impl WorkerConfig {
    /// Returns the compiled-in configuration for the EOS solver deployment
    ///
    /// # Arguments
    /// * `scope` - The URL the app shell is served under (should end with
    ///   a slash so relative entries join correctly)
    pub fn standard(scope: Url) -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            scope,
            manifest: Manifest::standard(),
            purge_stale_on_activate: true,
        }
    }
}

/// The offline worker for one registration
///
/// Writes to the cache store happen only inside `install`; every other
/// path only reads, so concurrent `handle_fetch` calls never race a
/// writer once the worker is ready.
pub struct Worker {
    config: WorkerConfig,
    registry: CacheRegistry,
    fetcher: Arc<dyn Fetcher>,
    state: RwLock<WorkerState>,
}

impl Worker {
    /// Creates a worker in the installing state
    pub fn new(config: WorkerConfig, registry: CacheRegistry, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            registry,
            fetcher,
            state: RwLock::new(WorkerState::Installing),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        *self.state.read().expect("worker state lock poisoned")
    }

    /// The configuration this worker was created with
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    fn set_state(&self, state: WorkerState) {
        *self.state.write().expect("worker state lock poisoned") = state;
    }

    /// Fetches one manifest URL, failing on any non-success status
    async fn precache_one(&self, url: &Url) -> Result<(RequestKey, FetchedResponse), InstallError> {
        let response = self
            .fetcher
            .fetch("GET", url)
            .await
            .map_err(|source| InstallError::FetchFailed {
                url: url.clone(),
                source,
            })?;

        if !response.is_success() {
            return Err(InstallError::BadStatus {
                url: url.clone(),
                status: response.status,
            });
        }

        Ok((RequestKey::get(url), response))
    }

    /// Runs the install phase: precache every manifest URL, all-or-nothing
    ///
    /// All fetches run concurrently with no defined relative order. The
    /// batch is written to a staging store only after every fetch has
    /// succeeded and renamed under the version tag only after every write
    /// has succeeded, so a failed attempt commits nothing. On success the
    /// activation step runs (stale stores are purged unless disabled) and
    /// the worker becomes ready.
    ///
    /// # Returns
    /// * `Ok(InstallReport)` - the store is fully populated
    /// * `Err(InstallError)` - the attempt failed as a whole; the caller
    ///   may retry the entire install
    pub async fn install(&self) -> Result<InstallReport, InstallError> {
        if self.state().can_resolve() {
            return Err(InstallError::AlreadyInstalled);
        }

        let urls = self.config.manifest.resolve(&self.config.scope)?;
        let fetched = try_join_all(urls.iter().map(|url| self.precache_one(url))).await?;

        // Every fetch succeeded; commit the whole batch. Entries go into
        // a staging store that is renamed into place only once every
        // write succeeded, so a write failure cannot leave a partially
        // populated store under the current tag.
        let store = self.registry.stage(&self.config.cache_name)?;
        for (key, response) in &fetched {
            let stored =
                StoredResponse::new(response.status, response.headers.clone(), response.body.clone());
            if let Err(err) = store.put(key, &stored) {
                let _ = self.registry.discard(&self.config.cache_name);
                return Err(err.into());
            }
        }
        self.registry.commit(&self.config.cache_name)?;

        let purged = if self.config.purge_stale_on_activate {
            self.registry.purge_stale(&self.config.cache_name)?
        } else {
            Vec::new()
        };

        self.set_state(WorkerState::Ready);

        Ok(InstallReport {
            cache_name: self.config.cache_name.clone(),
            entries: fetched.len(),
            purged,
        })
    }

    /// Resumes a worker whose install was committed by a previous run
    ///
    /// A restarted process does not reinstall; if the versioned store
    /// already exists on disk the worker goes straight to ready.
    pub fn resume(&self) -> Result<(), InstallError> {
        if !self.registry.exists(&self.config.cache_name) {
            return Err(InstallError::NotInstalled(self.config.cache_name.clone()));
        }
        self.set_state(WorkerState::Ready);
        Ok(())
    }

    /// Resolves one request cache-first
    ///
    /// The request identity is matched across every reachable store. A
    /// hit returns the stored response verbatim with no network access
    /// and no freshness check. A miss performs exactly one live fetch for
    /// the identical request and returns whatever it yields, success or
    /// failure, unchanged. This path never writes to any store.
    ///
    /// # Errors
    /// * `ResolveError::NotReady` if called before the worker is ready
    /// * `ResolveError::Network` if the fallback fetch itself failed
    pub async fn handle_fetch(&self, key: &RequestKey) -> Result<Resolution, ResolveError> {
        let state = self.state();
        if !state.can_resolve() {
            return Err(ResolveError::NotReady(state));
        }

        if let Some(stored) = self.registry.match_any(key)? {
            return Ok(Resolution {
                status: stored.status,
                headers: stored.headers,
                body: stored.body,
                source: ResponseSource::Cache,
            });
        }

        let url = Url::parse(key.url())
            .map_err(|_| ResolveError::InvalidKeyUrl(key.url().to_string()))?;
        let response = self.fetcher.fetch(key.method(), &url).await?;

        Ok(Resolution {
            status: response.status,
            headers: response.headers,
            body: response.body,
            source: ResponseSource::Network,
        })
    }
}
