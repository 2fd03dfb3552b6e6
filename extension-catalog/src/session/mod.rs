//! The session-scoped context object.
//!
//! A [`CatalogSession`] owns the repository store, the persistent cache,
//! the fetcher, the filter engine, the derived vocabularies and the URL
//! sync tracker, and wires them together into the operations a frontend
//! drives: fetch cycles, repository management, state restoration from a
//! query string and query-string emission.
//!
//! Execution is single-threaded and cooperative. Fetch cycles can still
//! interleave at await points, so each cycle carries a generation number
//! and only the latest generation may replace the shared record list.

use crate::available::AvailableData;
use crate::cache::PersistentCache;
use crate::catalog::{CatalogFetcher, ExtensionRecord};
use crate::filter::FilterEngine;
use crate::repos::{detect_branch, parse_repo_input, AddStatus, RepoError, RepoStore};
use crate::url_state::{self, UrlSync};
use octocrab::Octocrab;
use std::path::Path;
use tracing::{debug, info_span, Instrument};

/// Session state shared by every subsystem for the lifetime of one
/// browsing session.
pub struct CatalogSession {
    store: RepoStore,
    cache: PersistentCache,
    fetcher: CatalogFetcher,
    // Built on first use: constructing an Octocrab spawns a tokio task,
    // so it must not happen in the synchronous constructors.
    octocrab: Option<Octocrab>,
    engine: FilterEngine,
    available: AvailableData,
    url_sync: UrlSync,
    records: Vec<ExtensionRecord>,
    loading: bool,
    error: Option<String>,
    next_generation: u64,
    applied_generation: u64,
}

impl CatalogSession {
    /// Creates a session backed by `data_dir` for both persisted blobs
    /// (`repositories.json`, `api-cache.json`).
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        Self::with_parts(RepoStore::load(data_dir), PersistentCache::load(data_dir))
    }

    /// Creates a session with no backing storage, for tests and one-shot
    /// invocations.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_parts(RepoStore::in_memory(), PersistentCache::in_memory())
    }

    fn with_parts(store: RepoStore, cache: PersistentCache) -> Self {
        Self {
            store,
            cache,
            fetcher: CatalogFetcher::new(),
            octocrab: None,
            engine: FilterEngine::new(),
            available: AvailableData::new(),
            url_sync: UrlSync::new(),
            records: Vec::new(),
            loading: false,
            error: None,
            next_generation: 0,
            applied_generation: 0,
        }
    }

    /// Replaces the GitHub client, e.g. with an authenticated one.
    #[must_use]
    pub fn with_octocrab(mut self, octocrab: Octocrab) -> Self {
        self.octocrab = Some(octocrab);
        self
    }

    /// The GitHub client, built anonymously on first use. Only called
    /// from async paths, inside the runtime.
    fn github_client(&mut self) -> &Octocrab {
        self.octocrab.get_or_insert_with(Octocrab::default)
    }

    /// Runs one fetch cycle over every configured repository.
    ///
    /// Per-repository failures degrade to zero records (or the stale
    /// cache snapshot) and never set the session error. A cycle that was
    /// superseded by a later one while awaiting the network discards its
    /// result instead of overwriting the newer catalog.
    pub async fn fetch_all(&mut self, show_loading: bool) {
        self.next_generation += 1;
        let generation = self.next_generation;

        if show_loading {
            self.loading = true;
        }
        self.error = None;

        let repos = self.store.all();
        let records = self
            .fetcher
            .fetch_all(&mut self.cache, &repos)
            .instrument(info_span!("fetch_cycle", generation))
            .await;

        if generation > self.applied_generation {
            self.applied_generation = generation;
            self.records = records;
            self.available.refresh(&self.records);
        } else {
            debug!(generation, "Discarding superseded fetch cycle");
        }

        if show_loading {
            self.loading = false;
        }
    }

    /// Parses `input` (slug or GitHub URL), detects the branch, stores
    /// the repository and refetches the catalog.
    ///
    /// Re-adding a known id is a no-op success and triggers no refetch.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::InvalidInput`] when `input` is neither an
    /// `owner/name` slug nor a GitHub repository URL.
    pub async fn add_repository(&mut self, input: &str) -> Result<AddStatus, RepoError> {
        let repo_ref = parse_repo_input(input)?;
        let branch = detect_branch(self.github_client(), &repo_ref).await;
        let source =
            crate::repos::RepositorySource::new(&repo_ref.owner, &repo_ref.name, &branch);

        let status = self.store.insert(source);
        if matches!(status, AddStatus::Added(_)) {
            self.fetch_all(true).await;
        }

        Ok(status)
    }

    /// Removes a repository by id, then refetches without the loading
    /// flag so records from the removed source drop out of the view.
    ///
    /// Returns whether an entry was removed.
    pub async fn remove_repository(&mut self, id: &str) -> bool {
        let removed = self.store.remove(id);
        if removed {
            self.fetch_all(false).await;
        }
        removed
    }

    /// Restores the view state from a query string, validating language
    /// and label values against the vocabularies of the current catalog.
    pub fn restore_from_query(&mut self, query: &str) {
        let state = url_state::decode(query, self.available.languages(), self.available.labels());
        self.engine.restore(state);
        self.url_sync.reset(query);
    }

    /// Recomputes the query string for the current view state. Returns
    /// `Some` only when it changed since the last sync.
    pub fn sync_url(&mut self) -> Option<String> {
        self.url_sync.sync(self.engine.state(), &self.store.all())
    }

    /// The query string as of the last sync or restore.
    #[must_use]
    pub fn current_query(&self) -> &str {
        self.url_sync.current()
    }

    /// The current catalog view after all filter axes and the debounced
    /// search are applied.
    #[must_use]
    pub fn filtered(&self) -> Vec<&ExtensionRecord> {
        self.engine.filtered(&self.records)
    }

    /// The unfiltered record list of the latest applied fetch cycle.
    #[must_use]
    pub fn records(&self) -> &[ExtensionRecord] {
        &self.records
    }

    #[must_use]
    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FilterEngine {
        &mut self.engine
    }

    #[must_use]
    pub fn store(&self) -> &RepoStore {
        &self.store
    }

    /// Language tags present in the current catalog, for UI listings and
    /// URL validation.
    #[must_use]
    pub fn available_languages(&self) -> &[String] {
        self.available.languages()
    }

    /// Badge labels present in the current catalog.
    #[must_use]
    pub fn available_labels(&self) -> &[String] {
        self.available.labels()
    }

    /// Whether a loading-flagged fetch cycle is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The orchestration error of the last cycle, if any. Per-repository
    /// fetch failures never set this; they only log a warning.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Injects a record list directly, bypassing the network. The list
    /// replaces the catalog under the same generation rules as a fetch.
    pub fn inject_records(&mut self, records: Vec<ExtensionRecord>) {
        self.next_generation += 1;
        self.applied_generation = self.next_generation;
        self.records = records;
        self.available.refresh(&self.records);
    }
}
