//! Multi-axis catalog filtering.
//!
//! Five independent tri-state axes (content rating, language, badge label,
//! service, repository source) combine conjunctively with a debounced
//! free-text search. The label and service axes additionally carry an
//! AND/OR combination mode for their included keys.
//!
//! Each axis predicate reads only its own axis state, so a change on one
//! axis never forces another axis's selection to be reinterpreted;
//! keystrokes touch only the raw search text until the debounce settles.

mod axis;
mod search;

pub use axis::{AxisSelection, CombineMode};
pub use search::{SearchDebouncer, DEBOUNCE_DELAY};

use crate::available::language_key;
use crate::capabilities::CapabilitySet;
use crate::catalog::{ExtensionMetadata, ExtensionRecord};
use std::collections::BTreeSet;

/// Display name of the chapter-content service filter.
pub const CONTENT_SERVICE: &str = "Content Service";

/// Display name of the progress-tracking service filter.
pub const TRACKER_SERVICE: &str = "Tracker Service";

/// Display name of the Cloudflare bypass service filter.
pub const CLOUDFLARE_SERVICE: &str = "Cloudflare";

/// The fixed service filter vocabulary.
pub const SERVICE_NAMES: [&str; 3] = [CONTENT_SERVICE, TRACKER_SERVICE, CLOUDFLARE_SERVICE];

/// True if `name` is one of the fixed service filter names.
#[must_use]
pub fn is_valid_service(name: &str) -> bool {
    SERVICE_NAMES.contains(&name)
}

/// Evaluates a named service predicate against a capability set.
fn service_provided(capabilities: &CapabilitySet, service: &str) -> bool {
    match service {
        CONTENT_SERVICE => capabilities.provides_content(),
        TRACKER_SERVICE => capabilities.provides_tracking(),
        CLOUDFLARE_SERVICE => capabilities.bypasses_cloudflare(),
        _ => false,
    }
}

/// The complete user-driven view state: filter selections, combination
/// modes, extension selection, and the open detail reference.
///
/// This is the object the URL codec serializes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Raw search text as typed.
    pub search_query: String,

    /// Content rating axis, keyed by wire form (`"SAFE"`...).
    pub ratings: AxisSelection,

    /// Language axis, keyed by canonical tag or passthrough label.
    pub languages: AxisSelection,

    /// Badge label axis.
    pub labels: AxisSelection,

    /// Service axis, keyed by display name.
    pub services: AxisSelection,

    /// Repository source axis, keyed by source id.
    pub sources: AxisSelection,

    /// Combination mode for included badge labels.
    pub badge_mode: CombineMode,

    /// Combination mode for included services.
    pub service_mode: CombineMode,

    /// Selected extension ids.
    pub selected: BTreeSet<String>,

    /// Restrict the view to selected extensions.
    pub show_only_selected: bool,

    /// Currently opened detail view, as `source-id` + `-` + extension id.
    pub open_detail: Option<String>,
}

impl ViewState {
    /// Strips keys present on both sides of any axis, included winning.
    pub fn resolve_conflicts(&mut self) {
        self.ratings.resolve_conflicts();
        self.languages.resolve_conflicts();
        self.labels.resolve_conflicts();
        self.services.resolve_conflicts();
        self.sources.resolve_conflicts();
    }
}

/// Holds the view state and produces the filtered catalog view.
#[derive(Debug, Default)]
pub struct FilterEngine {
    state: ViewState,
    search: SearchDebouncer,
}

impl FilterEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current view state.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Replaces the whole view state, e.g. after a URL restore.
    ///
    /// Conflicts are resolved and the search query applies immediately,
    /// without waiting out the debounce.
    pub fn restore(&mut self, mut state: ViewState) {
        state.resolve_conflicts();
        self.search.clear();
        self.search.input(&state.search_query);
        self.search.flush();
        self.state = state;
    }

    /// Records a search keystroke. The filtered view only changes once the
    /// debounce interval elapses.
    pub fn set_search(&mut self, text: &str) {
        self.state.search_query = text.to_string();
        self.search.input(text);
    }

    /// Applies pending search input if its quiet period elapsed. Returns
    /// whether the settled query changed.
    pub fn poll_search(&mut self) -> bool {
        self.search.poll()
    }

    /// Waits out the debounce and applies pending search input.
    pub async fn settle_search(&mut self) {
        self.search.settle().await;
    }

    /// The settled query currently driving filtering.
    #[must_use]
    pub fn debounced_query(&self) -> &str {
        self.search.settled()
    }

    pub fn toggle_rating(&mut self, key: &str) {
        self.state.ratings.toggle(key);
    }

    pub fn toggle_language(&mut self, key: &str) {
        self.state.languages.toggle(key);
    }

    pub fn toggle_label(&mut self, key: &str) {
        self.state.labels.toggle(key);
    }

    pub fn toggle_service(&mut self, key: &str) {
        self.state.services.toggle(key);
    }

    pub fn toggle_source(&mut self, key: &str) {
        self.state.sources.toggle(key);
    }

    /// Flips the badge label combination mode.
    pub fn toggle_badge_mode(&mut self) {
        self.state.badge_mode = self.state.badge_mode.flipped();
    }

    /// Flips the service combination mode.
    pub fn toggle_service_mode(&mut self) {
        self.state.service_mode = self.state.service_mode.flipped();
    }

    /// Selects or deselects one extension by its selection key
    /// (see [`ExtensionRecord::selection_key`]).
    pub fn toggle_selected(&mut self, key: &str) {
        if !self.state.selected.remove(key) {
            self.state.selected.insert(key.to_string());
        }
    }

    pub fn set_show_only_selected(&mut self, value: bool) {
        self.state.show_only_selected = value;
    }

    pub fn open_detail(&mut self, id: &str) {
        self.state.open_detail = Some(id.to_string());
    }

    pub fn close_detail(&mut self) {
        self.state.open_detail = None;
    }

    /// Clears every axis, the source axis included.
    pub fn clear_all_filters(&mut self) {
        self.clear_content_filters();
        self.state.sources.clear();
    }

    /// Clears the content axes, leaving repository source filters intact.
    pub fn clear_content_filters(&mut self) {
        self.state.ratings.clear();
        self.state.languages.clear();
        self.state.labels.clear();
        self.state.services.clear();
    }

    /// Clears the search text and every filter axis.
    pub fn clear_search(&mut self) {
        self.state.search_query.clear();
        self.search.clear();
        self.clear_all_filters();
    }

    /// Count of selected keys across the content axes (sources excluded,
    /// matching what the filter badge in a frontend would display).
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        self.state.ratings.len()
            + self.state.languages.len()
            + self.state.labels.len()
            + self.state.services.len()
    }

    /// True when any content filter or a settled search query is active.
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0 || !self.search.settled().trim().is_empty()
    }

    /// Applies the conjunction of all axis predicates and the search
    /// predicate to the record list.
    #[must_use]
    pub fn filtered<'a>(&self, records: &'a [ExtensionRecord]) -> Vec<&'a ExtensionRecord> {
        let query = self.search.settled().to_lowercase();
        records
            .iter()
            .filter(|record| self.matches(record, &query))
            .collect()
    }

    fn matches(&self, record: &ExtensionRecord, query: &str) -> bool {
        if self.state.show_only_selected && !self.state.selected.contains(&record.selection_key()) {
            return false;
        }

        matches_search(record, query)
            && self
                .state
                .ratings
                .allows(record.metadata.as_ref().map(|m| m.content_rating.as_str()))
            && self.state.sources.allows(Some(&record.source_id))
            && self.state.languages.allows(
                language_key(record.metadata.as_ref().and_then(|m| m.language.as_deref()))
                    .as_deref(),
            )
            && matches_labels(&self.state.labels, self.state.badge_mode, record)
            && matches_services(
                &self.state.services,
                self.state.service_mode,
                record.metadata.as_ref(),
            )
    }
}

/// Case-insensitive substring search over id, source id, description, and
/// badge labels. An empty query always passes.
fn matches_search(record: &ExtensionRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    record.id.to_lowercase().contains(query)
        || record.source_id.to_lowercase().contains(query)
        || record.metadata.as_ref().is_some_and(|meta| {
            meta.description.to_lowercase().contains(query)
                || meta
                    .badges
                    .iter()
                    .any(|badge| badge.label.to_lowercase().contains(query))
        })
}

fn matches_labels(axis: &AxisSelection, mode: CombineMode, record: &ExtensionRecord) -> bool {
    let labels = record
        .metadata
        .as_ref()
        .map(|meta| meta.badges.iter().map(|badge| badge.label.as_str()).collect::<Vec<_>>())
        .unwrap_or_default();
    axis.allows_set(labels.iter().copied(), mode)
}

fn matches_services(
    axis: &AxisSelection,
    mode: CombineMode,
    metadata: Option<&ExtensionMetadata>,
) -> bool {
    let provides = |service: &str| {
        metadata.is_some_and(|meta| service_provided(&meta.capabilities, service))
    };

    let included_ok = axis.included().is_empty()
        || match mode {
            CombineMode::Any => axis.included().iter().any(|s| provides(s)),
            CombineMode::All => axis.included().iter().all(|s| provides(s)),
        };

    let excluded_ok = !axis.excluded().iter().any(|s| provides(s));
    included_ok && excluded_ok
}
