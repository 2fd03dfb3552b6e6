//! Catalog aggregation across repository sources.
//!
//! Every fetch cycle pulls each configured repository's manifest through
//! the persistent cache, fans the network requests out concurrently, and
//! merges the per-repository results into one sorted record list. A
//! repository whose fetch fails is isolated: it is logged, falls back to a
//! stale cache snapshot when one exists, and otherwise contributes zero
//! records for the cycle without failing the others.

mod error;
mod record;

pub use error::CatalogError;
pub use record::{
    base_url, browsable_url, canonical_url, icon_url, manifest_url, Badge, ContentRating,
    Developer, ExtensionMetadata, ExtensionRecord, Manifest, CONTENT_RATINGS, PLACEHOLDER_ICON,
};

use crate::cache::{CacheLookup, PersistentCache};
use crate::repos::RepositorySource;
use futures::future;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Cache operation kind for manifest documents.
const MANIFEST_KIND: &str = "versioning";

/// Outcome of one repository's fetch within a cycle.
#[derive(Debug)]
pub struct RepoFetchOutcome {
    /// The repository this outcome belongs to.
    pub repo: RepositorySource,

    /// The manifest to merge, or `None` when the repository contributes
    /// zero records this cycle.
    pub manifest: Option<Manifest>,
}

/// Fetches manifests and assembles the unified extension record list.
#[derive(Debug, Clone)]
pub struct CatalogFetcher {
    client: reqwest::Client,
}

impl Default for CatalogFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogFetcher {
    /// Creates a fetcher with a shared HTTP client.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("extension-catalog")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }

    /// Fetches one repository's manifest document as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on network failure or a non-success status.
    pub async fn fetch_manifest_value(
        &self,
        repo: &RepositorySource,
    ) -> Result<Value, CatalogError> {
        let url = manifest_url(repo);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status().as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Runs one full fetch cycle over `repos` and returns the merged,
    /// sorted record list.
    ///
    /// Cache reads and writes happen outside any await point so the
    /// load-modify-save of the cache blob stays an atomic unit; only the
    /// network requests themselves run concurrently.
    pub async fn fetch_all(
        &self,
        cache: &mut PersistentCache,
        repos: &[RepositorySource],
    ) -> Vec<ExtensionRecord> {
        let repo_count = repos.len();

        // Phase 1: consult the cache for every repository. The stale
        // snapshot must be read before get_fresh, which evicts on
        // staleness.
        let mut stales: Vec<Option<Manifest>> = Vec::with_capacity(repos.len());
        let mut manifests: Vec<Option<Manifest>> = Vec::with_capacity(repos.len());
        for repo in repos {
            let key = PersistentCache::key(&repo.owner, &repo.name, &repo.branch, MANIFEST_KIND);

            let stale = match cache.get(&key, repo_count) {
                CacheLookup::Hit { value, .. } => parse_manifest(repo, &value),
                CacheLookup::Miss => None,
            };

            let fresh = cache
                .get_fresh(&key, repo_count)
                .and_then(|value| parse_manifest(repo, &value));
            if fresh.is_some() {
                debug!(repo = %repo.display_name, "Manifest served from cache");
            }

            stales.push(stale);
            manifests.push(fresh);
        }

        // Phase 2: fan out network fetches for the cache misses. One
        // repository's failure must not block or fail the others.
        let fetches = repos
            .iter()
            .enumerate()
            .filter(|(idx, _)| manifests[*idx].is_none())
            .map(|(idx, repo)| async move { (idx, self.fetch_manifest_value(repo).await) });
        let results = future::join_all(fetches).await;

        // Phase 3: cache successful responses and fall back to the stale
        // snapshot where the refresh itself failed.
        for (idx, result) in results {
            let repo = &repos[idx];
            manifests[idx] = match result {
                Ok(value) => match parse_manifest(repo, &value) {
                    Some(manifest) => {
                        let key = PersistentCache::key(
                            &repo.owner,
                            &repo.name,
                            &repo.branch,
                            MANIFEST_KIND,
                        );
                        cache.put(&key, value);
                        Some(manifest)
                    }
                    None => stale_fallback(repo, stales[idx].take()),
                },
                Err(e) => {
                    warn!(repo = %repo.display_name, error = %e, "Failed to fetch manifest");
                    stale_fallback(repo, stales[idx].take())
                }
            };
        }

        let outcomes: Vec<RepoFetchOutcome> = repos
            .iter()
            .zip(manifests)
            .map(|(repo, manifest)| RepoFetchOutcome {
                repo: repo.clone(),
                manifest,
            })
            .collect();

        merge_cycle(outcomes)
    }
}

/// Merges per-repository outcomes into the unified record list, sorted by
/// extension id. The returned list replaces the previous catalog
/// atomically; it is never patched incrementally.
#[must_use]
pub fn merge_cycle(outcomes: Vec<RepoFetchOutcome>) -> Vec<ExtensionRecord> {
    let mut records = Vec::new();

    for outcome in outcomes {
        let Some(manifest) = outcome.manifest else {
            continue;
        };

        records.extend(
            manifest
                .sources
                .into_iter()
                .map(|metadata| ExtensionRecord::from_metadata(&outcome.repo, metadata)),
        );
    }

    // Case-insensitive ordering, with a case-sensitive tiebreak so equal
    // ids still sort deterministically.
    records.sort_by(|a, b| {
        a.id.to_lowercase()
            .cmp(&b.id.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    info!(count = records.len(), "Catalog assembled");
    records
}

/// Parses a manifest out of a raw JSON value, logging and discarding
/// malformed documents.
fn parse_manifest(repo: &RepositorySource, value: &Value) -> Option<Manifest> {
    match serde_json::from_value::<Manifest>(value.clone()) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!(repo = %repo.display_name, error = %e, "Malformed manifest");
            None
        }
    }
}

/// Serves the pre-eviction stale snapshot after a failed refresh, if any.
fn stale_fallback(repo: &RepositorySource, stale: Option<Manifest>) -> Option<Manifest> {
    if stale.is_some() {
        warn!(repo = %repo.display_name, "Refresh failed, serving stale manifest");
    }
    stale
}
