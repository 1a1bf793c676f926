//! Registry of cache stores under one cache root
//!
//! The registry knows where stores live on disk, enumerates them, opens
//! them by version tag, matches a request identity across all of them, and
//! deletes stores whose tag has been superseded.

use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::manager::{CacheStore, RequestKey, StoreError, StoredResponse};

/// Prefix marking a store directory that is staged but not yet committed
const STAGING_PREFIX: &str = ".staging-";

/// Directory name a store is staged under before its commit
fn staging_dir_name(name: &str) -> String {
    format!("{}{}", STAGING_PREFIX, name)
}

/// Locates and manages the cache stores under a single root directory
///
/// Each immediate subdirectory of the root is one store, named by its
/// version tag. The default root is an XDG-compliant cache directory
/// (`~/.cache/eosworker/` on Linux).
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    /// Directory under which every store lives
    root: PathBuf,
}

impl CacheRegistry {
    /// Creates a registry rooted at the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g.,
    /// no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "eosworker")?;
        Some(Self {
            root: project_dirs.cache_dir().to_path_buf(),
        })
    }

    /// Creates a registry with a custom root directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// The directory under which stores are kept
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Opens (creating if absent) the store with the given version tag
    pub fn open(&self, name: &str) -> Result<CacheStore, StoreError> {
        CacheStore::open(&self.root, name)
    }

    /// Returns true if a store with the given tag already exists on disk
    pub fn exists(&self, name: &str) -> bool {
        self.root.join(name).is_dir()
    }

    /// Lists the version tags of every store under the root, sorted
    ///
    /// A missing root directory is an empty registry, not an error.
    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for dir_entry in entries {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if dir_entry.file_type()?.is_dir() && !name.starts_with(STAGING_PREFIX) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Opens a fresh staging store for the given version tag
    ///
    /// Entries written to a staged store are invisible to `names`,
    /// `exists` and `match_any` until `commit` renames the store into
    /// place. Leftover staging data from an earlier interrupted install
    /// is discarded first.
    pub fn stage(&self, name: &str) -> Result<CacheStore, StoreError> {
        let staging = staging_dir_name(name);
        self.delete(&staging)?;
        CacheStore::open(&self.root, &staging)
    }

    /// Replaces the store `name` with its staged contents
    ///
    /// The staged directory is renamed into place, so observers see either
    /// the previous store or the fully populated new one, never a partial
    /// mix of the two.
    pub fn commit(&self, name: &str) -> Result<(), StoreError> {
        let staging = self.root.join(staging_dir_name(name));
        let target = self.root.join(name);
        if target.is_dir() {
            fs::remove_dir_all(&target)?;
        }
        fs::rename(&staging, &target)?;
        Ok(())
    }

    /// Drops a staged store for `name` without committing it
    pub fn discard(&self, name: &str) -> Result<(), StoreError> {
        self.delete(&staging_dir_name(name))
    }

    /// Matches a request identity against every reachable store
    ///
    /// Stores are searched in sorted tag order; the first hit wins. This
    /// is the fetch-time lookup: it searches whatever stores exist rather
    /// than reopening the current version tag explicitly.
    pub fn match_any(&self, key: &RequestKey) -> Result<Option<StoredResponse>, StoreError> {
        for name in self.names()? {
            let store = self.open(&name)?;
            if let Some(response) = store.get(key) {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }

    /// Deletes the store with the given tag and all of its entries
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let dir = self.root.join(name);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes every store whose tag differs from `current`
    ///
    /// This is the activation cleanup: superseded version tags are removed
    /// so stale stores do not accumulate across deployments.
    ///
    /// # Returns
    /// The tags of the stores that were deleted, in sorted order.
    pub fn purge_stale(&self, current: &str) -> Result<Vec<String>, StoreError> {
        let mut purged = Vec::new();
        for name in self.names()? {
            if name != current {
                self.delete(&name)?;
                purged.push(name);
            }
        }
        Ok(purged)
    }
}
