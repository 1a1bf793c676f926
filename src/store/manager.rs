//! On-disk cache store holding precached responses
//!
//! A `CacheStore` is one named, versioned container of stored responses,
//! keyed by request identity (method + URL). Each entry lives as a pair of
//! files under the store's directory: a JSON metadata file with the status
//! line, headers and timestamps, and a sibling `.bin` file with the raw
//! body bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors that can occur when reading or writing a cache store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("Cache store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Entry metadata could not be encoded
    #[error("Failed to encode cache entry metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// The identity a request is matched under: method plus absolute URL
///
/// Two requests with the same method and URL share one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: String,
    url: String,
}

impl RequestKey {
    /// Creates a key for the given method and URL
    pub fn new(method: &str, url: &Url) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url: url.as_str().to_string(),
        }
    }

    /// Creates a key for a GET request, the common case for asset loads
    pub fn get(url: &Url) -> Self {
        Self::new("GET", url)
    }

    /// Rebuilds a key from stored metadata fields
    fn from_parts(method: String, url: String) -> Self {
        Self { method, url }
    }

    /// The request method this key matches
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The absolute URL this key matches
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Filename-safe stem for this key's on-disk entry
    fn file_stem(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b" ");
        hasher.update(self.url.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A response held in a cache store: status, headers, body and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    /// HTTP status code of the stored response
    pub status: u16,
    /// Response headers in arrival order
    pub headers: Vec<(String, String)>,
    /// Raw body bytes
    pub body: Vec<u8>,
    /// When the response was stored
    pub stored_at: DateTime<Utc>,
}

impl StoredResponse {
    /// Creates a stored response timestamped now
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
            stored_at: Utc::now(),
        }
    }
}

/// Metadata file contents for one cache entry
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    method: String,
    url: String,
    status: u16,
    headers: Vec<(String, String)>,
    stored_at: DateTime<Utc>,
}

/// One named, versioned on-disk store of responses
///
/// Created lazily on first open; persists across process restarts until
/// explicitly deleted through the registry. Written only during install,
/// read continuously at fetch time.
#[derive(Debug, Clone)]
pub struct CacheStore {
    name: String,
    dir: PathBuf,
}

impl CacheStore {
    /// Opens (creating if absent) the store named `name` under `root`
    pub(crate) fn open(root: &Path, name: &str) -> Result<Self, StoreError> {
        let dir = root.join(name);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            name: name.to_string(),
            dir,
        })
    }

    /// The version tag this store is named by
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the metadata file for a key
    fn meta_path(&self, key: &RequestKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.file_stem()))
    }

    /// Path of the body file for a key
    fn body_path(&self, key: &RequestKey) -> PathBuf {
        self.dir.join(format!("{}.bin", key.file_stem()))
    }

    /// Stores a response under the given request identity
    ///
    /// An existing entry for the same identity is overwritten. The body is
    /// written before the metadata so a completed metadata file always has
    /// its body alongside it.
    pub fn put(&self, key: &RequestKey, response: &StoredResponse) -> Result<(), StoreError> {
        let meta = EntryMeta {
            method: key.method().to_string(),
            url: key.url().to_string(),
            status: response.status,
            headers: response.headers.clone(),
            stored_at: response.stored_at,
        };
        let json = serde_json::to_string_pretty(&meta)?;

        fs::write(self.body_path(key), &response.body)?;
        fs::write(self.meta_path(key), json)?;
        Ok(())
    }

    /// Looks up the stored response for a request identity
    ///
    /// Returns `None` if no entry exists or an entry's files cannot be
    /// read back (a damaged entry is treated as a miss, not an error).
    pub fn get(&self, key: &RequestKey) -> Option<StoredResponse> {
        let json = fs::read_to_string(self.meta_path(key)).ok()?;
        let meta: EntryMeta = serde_json::from_str(&json).ok()?;
        let body = fs::read(self.body_path(key)).ok()?;

        Some(StoredResponse {
            status: meta.status,
            headers: meta.headers,
            body,
            stored_at: meta.stored_at,
        })
    }

    /// Returns true if an entry exists for the given identity
    pub fn contains(&self, key: &RequestKey) -> bool {
        self.meta_path(key).is_file()
    }

    /// Lists the request identities of every entry in the store
    pub fn keys(&self) -> Result<Vec<RequestKey>, StoreError> {
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let json = fs::read_to_string(&path)?;
            let meta: EntryMeta = serde_json::from_str(&json)?;
            keys.push(RequestKey::from_parts(meta.method, meta.url));
        }
        keys.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.method.cmp(&b.method)));
        Ok(keys)
    }

    /// Number of entries in the store
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.keys()?.len())
    }

    /// Returns true if the store holds no entries
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
