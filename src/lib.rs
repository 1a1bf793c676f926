//! Offline asset cache for the EOS solver web app
//!
//! At install time the worker downloads a fixed manifest of asset URLs
//! (the app shell plus the CDN-hosted CSS framework and Pyodide runtime)
//! into a named, versioned cache store, all-or-nothing. Afterwards every
//! resource request is answered cache-first: a stored response when one
//! matches, otherwise a single live network fetch whose result is
//! returned unchanged and never written back.

pub mod cli;
pub mod fetcher;
pub mod manifest;
pub mod store;
pub mod worker;
