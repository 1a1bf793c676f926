//! Versioned on-disk cache stores for precached responses
//!
//! A store is a named key-value container mapping request identities
//! (method + URL) to stored responses (status, headers, body). Stores are
//! created lazily, persist across restarts, and are written only during
//! install; the registry enumerates them, matches requests across all of
//! them, and deletes superseded version tags.

mod manager;
mod registry;

pub use manager::{CacheStore, RequestKey, StoreError, StoredResponse};
pub use registry::CacheRegistry;
