//! TTL-keyed cache over `(repo, module_path, local_module_path) -> (version, checked_at)`
//! shared across a single plan/release invocation's parallel check workers.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

type CacheKey = (String, String, String);

struct Entry {
    version: String,
    checked_at: DateTime<Utc>,
}

/// Caches the *current* required version observed for a dependent, so a
/// second check within `ttl` of the first reuses it instead of re-reading
/// `go.mod` or re-hitting the code host.
pub struct CheckCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl CheckCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    fn key(repo: &str, module_path: &str, local_module_path: &str) -> CacheKey {
        (repo.to_string(), module_path.to_string(), local_module_path.to_string())
    }

    /// Returns the cached version if one is present and not older than `ttl`.
    pub async fn get(&self, repo: &str, module_path: &str, local_module_path: &str) -> Option<String> {
        let key = Self::key(repo, module_path, local_module_path);
        let entries = self.entries.lock().await;
        let entry = entries.get(&key)?;
        let age = Utc::now().signed_duration_since(entry.checked_at);
        if age.to_std().map(|d| d <= self.ttl).unwrap_or(false) {
            debug!(%repo, %module_path, "CheckCache::get: hit");
            Some(entry.version.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, repo: &str, module_path: &str, local_module_path: &str, version: String) {
        let key = Self::key(repo, module_path, local_module_path);
        let mut entries = self.entries.lock().await;
        entries.insert(key, Entry { version, checked_at: Utc::now() });
    }
}
