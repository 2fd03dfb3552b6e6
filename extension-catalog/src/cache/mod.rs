//! Persistent API response cache with a dynamic time-to-live.
//!
//! The remote host enforces an hourly call budget, so entry freshness is
//! scaled to the number of configured repositories: with `n` repositories
//! an entry stays fresh for `max(n, 1)` minutes. The TTL is recomputed from
//! the repository count current at every freshness check, not fixed at
//! write time. The boundary is inclusive: an entry counts as fresh through
//! `fetch_time + ttl` exactly and turns stale strictly after that instant
//! (age `> ttl`, matching the window formula rather than reading the
//! boundary instant as already expired).
//!
//! Two read paths exist on purpose. [`PersistentCache::get`] is a
//! non-destructive status view used to take a stale snapshot before any
//! refresh attempt; [`PersistentCache::get_fresh`] is the freshness gate
//! that evicts stale entries as a side effect. Collapsing them would either
//! lose the stale-fallback capability or prevent evicting dead entries.
//!
//! All persistence is best-effort: corrupt or unwritable cache files are
//! logged and degraded to an empty cache, never fatal.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// File name of the persisted cache blob inside the data directory.
const CACHE_FILE: &str = "api-cache.json";

/// Freshness window contributed by each configured repository.
const TTL_PER_REPO_MS: u64 = 60_000;

/// One cached API response with its fetch timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached response body.
    pub data: Value,

    /// Unix timestamp in milliseconds when the response was fetched.
    #[serde(rename = "fetchTime")]
    pub fetch_time: u64,
}

/// Result of a non-destructive cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// The key is present. `is_stale` reports whether the entry has
    /// outlived its freshness window.
    Hit {
        /// The cached value.
        value: Value,
        /// True when the entry is past its TTL.
        is_stale: bool,
    },

    /// The key is absent.
    Miss,
}

/// Key/value store of API responses persisted as a single JSON blob.
#[derive(Debug)]
pub struct PersistentCache {
    entries: HashMap<String, CacheEntry>,
    path: Option<PathBuf>,
}

impl PersistentCache {
    /// Loads the cache blob from `data_dir`, degrading corrupt or missing
    /// data to an empty cache. The corrupt file is left in place; it will
    /// be overwritten by the next successful [`put`][Self::put].
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CACHE_FILE);
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt cache file, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            entries,
            path: Some(path),
        }
    }

    /// Creates an in-memory cache with no backing file.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            entries: HashMap::new(),
            path: None,
        }
    }

    /// Derives the cache key for an operation against one repository.
    #[must_use]
    pub fn key(owner: &str, name: &str, branch: &str, kind: &str) -> String {
        format!("{owner}/{name}@{branch}:{kind}")
    }

    /// Non-destructive lookup reporting presence and staleness.
    ///
    /// Callers planning a refresh must take this snapshot before calling
    /// [`get_fresh`][Self::get_fresh], which evicts stale entries.
    #[must_use]
    pub fn get(&self, key: &str, repo_count: usize) -> CacheLookup {
        self.get_at(key, repo_count, now_ms())
    }

    /// Returns the value only when fresh, evicting the entry when stale.
    ///
    /// A `None` result means a network fetch is needed.
    pub fn get_fresh(&mut self, key: &str, repo_count: usize) -> Option<Value> {
        self.get_fresh_at(key, repo_count, now_ms())
    }

    /// Stores `value` under `key` with the current time as fetch time,
    /// overwriting any prior entry, and persists the cache.
    pub fn put(&mut self, key: &str, value: Value) {
        self.put_at(key, value, now_ms());
    }

    fn get_at(&self, key: &str, repo_count: usize, now: u64) -> CacheLookup {
        match self.entries.get(key) {
            Some(entry) => CacheLookup::Hit {
                value: entry.data.clone(),
                is_stale: now.saturating_sub(entry.fetch_time) > ttl_ms(repo_count),
            },
            None => CacheLookup::Miss,
        }
    }

    fn get_fresh_at(&mut self, key: &str, repo_count: usize, now: u64) -> Option<Value> {
        match self.get_at(key, repo_count, now) {
            CacheLookup::Hit { value, is_stale: false } => Some(value),
            CacheLookup::Hit { is_stale: true, .. } => {
                debug!(key, "Evicting stale cache entry");
                self.entries.remove(key);
                self.persist();
                None
            }
            CacheLookup::Miss => None,
        }
    }

    fn put_at(&mut self, key: &str, value: Value, now: u64) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data: value,
                fetch_time: now,
            },
        );
        self.persist();
    }

    /// Writes the cache blob to disk. Failures (quota, serialization, IO)
    /// are logged and swallowed.
    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };

        let serialized = match serde_json::to_string(&self.entries) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cache");
                return;
            }
        };

        if let Err(e) = std::fs::write(path, serialized) {
            warn!(path = %path.display(), error = %e, "Failed to persist cache");
        }
    }
}

/// Freshness window for the current repository count, minimum one minute.
fn ttl_ms(repo_count: usize) -> u64 {
    repo_count.max(1) as u64 * TTL_PER_REPO_MS
}

/// Current Unix time in milliseconds.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_ttl_scales_with_repo_count() {
        assert_eq!(ttl_ms(0), 60_000);
        assert_eq!(ttl_ms(1), 60_000);
        assert_eq!(ttl_ms(3), 180_000);
    }

    #[test]
    fn test_stale_boundary_is_exclusive() {
        let mut cache = PersistentCache::in_memory();
        cache.put_at("k", json!(1), 1_000);

        // Fresh at exactly t + ttl, stale strictly after.
        match cache.get_at("k", 2, 1_000 + 120_000) {
            CacheLookup::Hit { is_stale, .. } => assert!(!is_stale),
            CacheLookup::Miss => panic!("expected hit"),
        }
        match cache.get_at("k", 2, 1_000 + 120_001) {
            CacheLookup::Hit { is_stale, .. } => assert!(is_stale),
            CacheLookup::Miss => panic!("expected hit"),
        }
    }

    #[test]
    fn test_get_fresh_evicts_stale() {
        let mut cache = PersistentCache::in_memory();
        cache.put_at("k", json!("v"), 0);

        assert!(cache.get_fresh_at("k", 1, 61_000).is_none());
        // The stale entry was evicted, not retained.
        assert_eq!(cache.get_at("k", 1, 61_000), CacheLookup::Miss);
    }

    #[test]
    fn test_get_does_not_evict() {
        let mut cache = PersistentCache::in_memory();
        cache.put_at("k", json!("v"), 0);

        let snapshot = cache.get_at("k", 1, 61_000);
        assert!(matches!(snapshot, CacheLookup::Hit { is_stale: true, .. }));
        // Still present for a later fallback read.
        assert!(matches!(
            cache.get_at("k", 1, 61_000),
            CacheLookup::Hit { .. }
        ));
    }

    #[test]
    fn test_put_overwrites() {
        let mut cache = PersistentCache::in_memory();
        cache.put_at("k", json!(1), 0);
        cache.put_at("k", json!(2), 10);

        match cache.get_at("k", 1, 10) {
            CacheLookup::Hit { value, .. } => assert_eq!(value, json!(2)),
            CacheLookup::Miss => panic!("expected hit"),
        }
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = TempDir::new().unwrap();
        {
            let mut cache = PersistentCache::load(dir.path());
            cache.put("k", json!({"sources": []}));
        }

        let cache = PersistentCache::load(dir.path());
        assert!(matches!(cache.get("k", 1), CacheLookup::Hit { .. }));
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CACHE_FILE), "{not json").unwrap();

        let cache = PersistentCache::load(dir.path());
        assert_eq!(cache.get("k", 1), CacheLookup::Miss);
        // Corrupt cache files are not cleared, only ignored.
        assert!(dir.path().join(CACHE_FILE).exists());
    }

    #[test]
    fn test_key_derivation() {
        assert_eq!(
            PersistentCache::key("inkdex", "extensions", "master", "versioning"),
            "inkdex/extensions@master:versioning"
        );
    }
}
