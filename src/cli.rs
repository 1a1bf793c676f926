//! Command-line interface for the offline worker
//!
//! Parses arguments with clap and turns them into the registry and worker
//! configuration the library operates on. The manifest and cache version
//! tag are compiled in; the CLI only chooses the scope URL, the cache
//! root, and which lifecycle operation to run.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

use crate::store::CacheRegistry;
use crate::worker::WorkerConfig;

/// Scope the app shell is served under when none is given
pub const DEFAULT_SCOPE: &str = "http://localhost:8000/";

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The scope argument is not an absolute URL
    #[error("Invalid scope URL '{0}': the scope must be an absolute URL")]
    InvalidScope(String),

    /// No cache directory could be determined and none was given
    #[error("Could not determine a cache directory; pass --cache-dir explicitly")]
    NoCacheDir,
}

/// Offline asset cache for the EOS solver web app
#[derive(Parser, Debug)]
#[command(name = "eosworker")]
#[command(about = "Precache the EOS solver app's assets and serve them cache-first")]
#[command(version)]
pub struct Cli {
    /// Scope URL that relative manifest entries resolve against
    #[arg(long, global = true, value_name = "URL", default_value = DEFAULT_SCOPE)]
    pub scope: String,

    /// Directory holding the cache stores (defaults to the XDG cache path)
    #[arg(long, global = true, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Lifecycle operations exposed by the binary
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download and store every manifest URL into the versioned cache store
    Install {
        /// Keep stores with superseded version tags instead of deleting them
        #[arg(long)]
        keep_stale: bool,
    },

    /// Resolve one URL cache-first after a completed install
    Resolve {
        /// URL to resolve (absolute, or relative to the scope)
        url: String,

        /// Write the response body to this file
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List cache stores and their entry counts
    Status,

    /// Delete cache stores whose version tag is not the current one
    Clean,
}

impl Cli {
    /// Parses the scope argument into a URL
    pub fn scope_url(&self) -> Result<Url, CliError> {
        Url::parse(&self.scope).map_err(|_| CliError::InvalidScope(self.scope.clone()))
    }

    /// Builds the cache registry from the arguments
    ///
    /// Uses `--cache-dir` when given, otherwise the XDG-compliant default.
    pub fn registry(&self) -> Result<CacheRegistry, CliError> {
        match &self.cache_dir {
            Some(dir) => Ok(CacheRegistry::with_root(dir.clone())),
            None => CacheRegistry::new().ok_or(CliError::NoCacheDir),
        }
    }

    /// Builds the worker configuration from the arguments
    ///
    /// # Arguments
    /// * `keep_stale` - When true, activation leaves superseded stores in
    ///   place instead of deleting them
    pub fn worker_config(&self, keep_stale: bool) -> Result<WorkerConfig, CliError> {
        let mut config = WorkerConfig::standard(self.scope_url()?);
        config.purge_stale_on_activate = !keep_stale;
        Ok(config)
    }
}
