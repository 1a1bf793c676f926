//! End-to-end install and serve scenarios for the offline worker
//!
//! Drives the full lifecycle against a scripted network: precache the
//! manifest, serve hits from the store, fall back to the network on
//! misses, and fail the whole install when any one asset is unreachable.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use url::Url;

use eosworker::fetcher::{FetchError, FetchedResponse, Fetcher};
use eosworker::manifest::{Manifest, CACHE_NAME, PRECACHE_URLS};
use eosworker::store::{CacheRegistry, RequestKey};
use eosworker::worker::{InstallError, ResponseSource, Worker, WorkerConfig};

/// Scripted network that records every fetch that reaches it
struct ScriptedNetwork {
    routes: HashMap<String, FetchedResponse>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    fn new() -> Self {
        Self {
            routes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn route(mut self, url: &str, status: u16, body: &[u8]) -> Self {
        self.routes.insert(
            url.to_string(),
            FetchedResponse {
                status,
                headers: vec![("content-type".to_string(), "application/octet-stream".to_string())],
                body: body.to_vec(),
            },
        );
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedNetwork {
    async fn fetch(&self, _method: &str, url: &Url) -> Result<FetchedResponse, FetchError> {
        self.calls.lock().unwrap().push(url.as_str().to_string());
        self.routes
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Unreachable(url.as_str().to_string()))
    }
}

fn scope() -> Url {
    Url::parse("http://localhost:8000/").unwrap()
}

fn worker_with(
    manifest: Manifest,
    network: ScriptedNetwork,
) -> (Worker, Arc<ScriptedNetwork>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let registry = CacheRegistry::with_root(temp_dir.path().to_path_buf());
    let network = Arc::new(network);
    let config = WorkerConfig {
        cache_name: CACHE_NAME.to_string(),
        scope: scope(),
        manifest,
        purge_stale_on_activate: true,
    };
    let worker = Worker::new(config, registry, network.clone());
    (worker, network, temp_dir)
}

fn shell_manifest() -> Manifest {
    Manifest::new(vec!["./".to_string(), "./index.html".to_string()])
}

fn shell_network() -> ScriptedNetwork {
    ScriptedNetwork::new()
        .route("http://localhost:8000/", 200, b"<html>shell</html>")
        .route("http://localhost:8000/index.html", 200, b"<html>index</html>")
}

// Scenario A: both shell URLs fetch successfully at install, so the store
// contains exactly those two identities.
#[tokio::test]
async fn install_commits_exactly_the_manifest_entries() {
    let (worker, _network, temp_dir) = worker_with(shell_manifest(), shell_network());

    let report = worker.install().await.expect("install should succeed");
    assert_eq!(report.entries, 2);

    let registry = CacheRegistry::with_root(temp_dir.path().to_path_buf());
    let store = registry.open(CACHE_NAME).unwrap();
    let keys = store.keys().unwrap();

    assert_eq!(keys.len(), 2);
    assert!(keys.iter().any(|k| k.url() == "http://localhost:8000/"));
    assert!(keys.iter().any(|k| k.url() == "http://localhost:8000/index.html"));
}

// Scenario B: after install, a request for the index page is served from
// the store byte-identical to what was installed, with no network call.
#[tokio::test]
async fn cached_request_returns_installed_bytes_without_network() {
    let (worker, network, _temp_dir) = worker_with(shell_manifest(), shell_network());
    worker.install().await.expect("install should succeed");
    let calls_after_install = network.calls().len();

    let key = RequestKey::get(&Url::parse("http://localhost:8000/index.html").unwrap());
    let resolution = worker.handle_fetch(&key).await.expect("hit should resolve");

    assert_eq!(resolution.source, ResponseSource::Cache);
    assert_eq!(resolution.body, b"<html>index</html>");
    assert_eq!(network.calls().len(), calls_after_install);
}

// Scenario C: a request outside the manifest reaches the network exactly
// once, the network response comes back unmodified, and the store does not
// grow.
#[tokio::test]
async fn uncached_request_falls_back_once_and_store_is_unchanged() {
    let network = shell_network().route("http://localhost:8000/missing.js", 200, b"console.log(1)");
    let (worker, network, temp_dir) = worker_with(shell_manifest(), network);
    worker.install().await.expect("install should succeed");
    let calls_after_install = network.calls().len();

    let key = RequestKey::get(&Url::parse("http://localhost:8000/missing.js").unwrap());
    let resolution = worker.handle_fetch(&key).await.expect("miss should fall back");

    assert_eq!(resolution.source, ResponseSource::Network);
    assert_eq!(resolution.status, 200);
    assert_eq!(resolution.body, b"console.log(1)");
    assert_eq!(network.calls().len(), calls_after_install + 1);

    let registry = CacheRegistry::with_root(temp_dir.path().to_path_buf());
    let store = registry.open(CACHE_NAME).unwrap();
    assert_eq!(store.len().unwrap(), 2, "fallback must not grow the store");
}

// Scenario D: one manifest URL (the third-party stylesheet) is
// unreachable, so the install fails as a whole and nothing is committed.
#[tokio::test]
async fn unreachable_manifest_entry_fails_the_whole_install() {
    let manifest = Manifest::new(vec![
        "./".to_string(),
        "./index.html".to_string(),
        "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css".to_string(),
    ]);
    let (worker, _network, temp_dir) = worker_with(manifest, shell_network());

    let result = worker.install().await;

    match result {
        Err(InstallError::FetchFailed { url, .. }) => {
            assert!(url.as_str().contains("pico.min.css"));
        }
        other => panic!("Expected FetchFailed, got {:?}", other.map(|r| r.entries)),
    }

    let registry = CacheRegistry::with_root(temp_dir.path().to_path_buf());
    assert!(registry.names().unwrap().is_empty(), "no partial cache may survive");
}

// The compiled-in deployment manifest installs end to end once every CDN
// asset is reachable.
#[tokio::test]
async fn standard_manifest_installs_completely() {
    let mut network = ScriptedNetwork::new();
    let resolved = Manifest::standard().resolve(&scope()).unwrap();
    for url in &resolved {
        network = network.route(url.as_str(), 200, b"asset");
    }

    let (worker, _network, temp_dir) = worker_with(Manifest::standard(), network);
    let report = worker.install().await.expect("install should succeed");

    assert_eq!(report.entries, PRECACHE_URLS.len());

    let registry = CacheRegistry::with_root(temp_dir.path().to_path_buf());
    let store = registry.open(CACHE_NAME).unwrap();
    for url in &resolved {
        assert!(
            store.contains(&RequestKey::get(url)),
            "manifest URL '{}' missing after install",
            url
        );
    }
}

// A deployment bump installs into a new tag and deletes the old store.
#[tokio::test]
async fn new_version_tag_supersedes_the_old_store() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    let v1_config = WorkerConfig {
        cache_name: "eos-solver-v1".to_string(),
        scope: scope(),
        manifest: shell_manifest(),
        purge_stale_on_activate: true,
    };
    let v1 = Worker::new(
        v1_config,
        CacheRegistry::with_root(root.clone()),
        Arc::new(shell_network()),
    );
    v1.install().await.expect("v1 install should succeed");

    let v2_config = WorkerConfig {
        cache_name: "eos-solver-v2".to_string(),
        scope: scope(),
        manifest: shell_manifest(),
        purge_stale_on_activate: true,
    };
    let v2 = Worker::new(
        v2_config,
        CacheRegistry::with_root(root.clone()),
        Arc::new(shell_network()),
    );
    let report = v2.install().await.expect("v2 install should succeed");

    assert_eq!(report.purged, vec!["eos-solver-v1".to_string()]);
    let registry = CacheRegistry::with_root(root);
    assert_eq!(registry.names().unwrap(), vec!["eos-solver-v2".to_string()]);
}
