//! Query-string codec for the view state.
//!
//! The query string is the shareable external contract of the browser:
//! every filter selection, the extension selection, and the open detail
//! reference map to short reserved parameter keys. Parameters are omitted
//! when their underlying collection is empty, and the combination mode
//! parameters only appear while their axis holds at least one key.
//!
//! Label and selected-id lists carry an inner percent-encoding layer on
//! top of the form encoding because their values may contain reserved
//! characters such as commas.
//!
//! Language and label values in a URL are validated against the
//! vocabulary derived from the currently loaded catalog; entries a foreign
//! catalog produced are silently dropped.

use crate::catalog::ContentRating;
use crate::filter::{is_valid_service, CombineMode, ViewState};
use crate::repos::{RepositorySource, DEFAULT_SOURCE_ID};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::{BTreeSet, HashMap};
use url::form_urlencoded;

/// Inner encoding layer for list values; mirrors `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decodes a query string into a view state.
///
/// Unknown parameters are ignored; invalid ratings, services, languages
/// and labels are dropped; keys landing on both sides of an axis resolve
/// in favor of inclusion.
#[must_use]
pub fn decode(query: &str, valid_languages: &[String], valid_labels: &[String]) -> ViewState {
    let params: HashMap<String, String> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut state = ViewState::default();

    if let Some(search) = params.get("s") {
        state.search_query = search.to_lowercase();
    }

    if params.get("oss").map(String::as_str) == Some("true") {
        state.show_only_selected = true;
    }

    if let Some(raw) = params.get("sel") {
        state.selected = split_list(&inner_decode(raw)).collect();
    }

    if let Some(raw) = params.get("cr") {
        state.ratings.set_included(decode_ratings(raw));
    }
    if let Some(raw) = params.get("ncr") {
        state.ratings.add_excluded(decode_ratings(raw));
    }

    if let Some(raw) = params.get("svc") {
        state.services.set_included(decode_services(raw));
    }
    if let Some(raw) = params.get("nsvc") {
        state.services.add_excluded(decode_services(raw));
    }

    if let Some(raw) = params.get("l") {
        state
            .languages
            .set_included(filter_vocabulary(raw, valid_languages));
    }
    if let Some(raw) = params.get("nl") {
        state
            .languages
            .add_excluded(filter_vocabulary(raw, valid_languages));
    }

    if let Some(raw) = params.get("b") {
        state
            .labels
            .set_included(filter_vocabulary(&inner_decode(raw), valid_labels));
    }
    if let Some(raw) = params.get("nb") {
        state
            .labels
            .add_excluded(filter_vocabulary(&inner_decode(raw), valid_labels));
    }

    if let Some(raw) = params.get("r") {
        state.sources.set_included(split_list(raw));
    }
    if let Some(raw) = params.get("nr") {
        state.sources.add_excluded(split_list(raw));
    }

    if let Some(mode) = params.get("bm").and_then(|raw| CombineMode::parse(raw)) {
        state.badge_mode = mode;
    }
    if let Some(mode) = params.get("sm").and_then(|raw| CombineMode::parse(raw)) {
        state.service_mode = mode;
    }

    if let Some(id) = params.get("m") {
        if !id.is_empty() {
            state.open_detail = Some(id.clone());
        }
    }

    state.resolve_conflicts();
    state
}

/// Encodes a view state into a query string (without a leading `?`).
///
/// `sources` supplies owner/name/branch for the derived `ar` parameter,
/// which makes shared links self-describing for non-default repositories.
#[must_use]
pub fn encode(state: &ViewState, sources: &[RepositorySource]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if !state.sources.included().is_empty() {
        serializer.append_pair("r", &join(state.sources.included()));
    }
    if !state.sources.excluded().is_empty() {
        serializer.append_pair("nr", &join(state.sources.excluded()));
    }

    let external_urls = external_repo_urls(state, sources);
    if !external_urls.is_empty() {
        serializer.append_pair("ar", &external_urls.join(","));
    }

    if !state.search_query.is_empty() {
        serializer.append_pair("s", &state.search_query.to_lowercase());
    }

    if state.show_only_selected {
        serializer.append_pair("oss", "true");
    }

    if !state.selected.is_empty() {
        serializer.append_pair("sel", &inner_encode(&join(&state.selected)));
    }

    if !state.ratings.included().is_empty() {
        serializer.append_pair("cr", &join_lowercase(state.ratings.included()));
    }
    if !state.ratings.excluded().is_empty() {
        serializer.append_pair("ncr", &join_lowercase(state.ratings.excluded()));
    }

    if !state.services.included().is_empty() {
        serializer.append_pair("svc", &join_services(state.services.included()));
    }
    if !state.services.excluded().is_empty() {
        serializer.append_pair("nsvc", &join_services(state.services.excluded()));
    }

    if !state.languages.included().is_empty() {
        serializer.append_pair("l", &join(state.languages.included()));
    }
    if !state.languages.excluded().is_empty() {
        serializer.append_pair("nl", &join(state.languages.excluded()));
    }

    if !state.labels.included().is_empty() {
        serializer.append_pair("b", &inner_encode(&join(state.labels.included())));
    }
    if !state.labels.excluded().is_empty() {
        serializer.append_pair("nb", &inner_encode(&join(state.labels.excluded())));
    }

    // Mode parameters only persist while their axis is selecting; an axis
    // emptied since the last sync drops its mode from the URL.
    if !state.labels.is_empty() {
        serializer.append_pair("bm", state.badge_mode.as_str());
    }
    if !state.services.is_empty() {
        serializer.append_pair("sm", state.service_mode.as_str());
    }

    if let Some(id) = &state.open_detail {
        serializer.append_pair("m", id);
    }

    serializer.finish()
}

/// Tracks the last written query string so URL writes can be skipped when
/// nothing changed.
#[derive(Debug, Default)]
pub struct UrlSync {
    current: String,
}

impl UrlSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the tracker with the query string the session started from.
    pub fn reset(&mut self, query: &str) {
        self.current = query.to_string();
    }

    /// The last observed query string.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Recomputes the query string for `state` and returns it only when
    /// it differs from the current one. `None` means the write side must
    /// not touch anything.
    pub fn sync(&mut self, state: &ViewState, sources: &[RepositorySource]) -> Option<String> {
        let next = encode(state, sources);
        if next == self.current {
            return None;
        }

        self.current = next.clone();
        Some(next)
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

fn join<'a, I: IntoIterator<Item = &'a String>>(values: I) -> String {
    values
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn join_lowercase<'a, I: IntoIterator<Item = &'a String>>(values: I) -> String {
    values
        .into_iter()
        .map(|value| value.to_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

/// `"Content Service"` → `"content-service"`.
fn join_services<'a, I: IntoIterator<Item = &'a String>>(values: I) -> String {
    values
        .into_iter()
        .map(|value| value.to_lowercase().replace(' ', "-"))
        .collect::<Vec<_>>()
        .join(",")
}

fn inner_encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn inner_decode(value: &str) -> String {
    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Uppercases and validates rating values against the fixed enum.
fn decode_ratings(raw: &str) -> Vec<String> {
    split_list(raw)
        .filter_map(|value| {
            value
                .parse::<ContentRating>()
                .ok()
                .map(|rating| rating.as_str().to_string())
        })
        .collect()
}

/// `"content-service"` → `"Content Service"`, validated against the fixed
/// service set.
fn decode_services(raw: &str) -> Vec<String> {
    split_list(raw)
        .map(|value| {
            value
                .split('-')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|service| is_valid_service(service))
        .collect()
}

fn filter_vocabulary(raw: &str, vocabulary: &[String]) -> Vec<String> {
    split_list(raw)
        .filter(|value| vocabulary.iter().any(|known| known == value))
        .collect()
}

/// Resolvable URLs for every non-default source referenced by the source
/// axis, so recipients of a shared link can add missing repositories.
fn external_repo_urls(state: &ViewState, sources: &[RepositorySource]) -> Vec<String> {
    let referenced: BTreeSet<&String> = state
        .sources
        .included()
        .iter()
        .chain(state.sources.excluded().iter())
        .filter(|id| id.as_str() != DEFAULT_SOURCE_ID)
        .collect();

    referenced
        .into_iter()
        .filter_map(|id| sources.iter().find(|source| &source.id == id))
        .filter(|source| !source.owner.is_empty() && !source.name.is_empty())
        .map(|source| {
            if source.branch == "gh-pages" {
                format!("https://github.com/{}/{}", source.owner, source.name)
            } else {
                format!(
                    "https://github.com/{}/{}/tree/{}",
                    source.owner, source.name, source.branch
                )
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{CLOUDFLARE_SERVICE, CONTENT_SERVICE};

    fn vocab(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_decode_ratings_case_normalized_and_validated() {
        let state = decode("cr=mature,bogus&ncr=adult", &[], &[]);
        assert!(state.ratings.included().contains("MATURE"));
        assert!(!state.ratings.included().contains("BOGUS"));
        assert!(state.ratings.excluded().contains("ADULT"));
    }

    #[test]
    fn test_decode_services_from_hyphenated_form() {
        let state = decode("svc=content-service,cloudflare&nsvc=tracker-service", &[], &[]);
        assert!(state.services.included().contains("Content Service"));
        assert!(state.services.included().contains("Cloudflare"));
        assert!(state.services.excluded().contains("Tracker Service"));
    }

    #[test]
    fn test_decode_drops_unknown_vocabulary() {
        let languages = vocab(&["en", "ja"]);
        let labels = vocab(&["Action"]);

        let state = decode("l=en,fr&b=Action%2CUnknown", &languages, &labels);
        assert!(state.languages.included().contains("en"));
        assert!(!state.languages.included().contains("fr"));
        assert!(state.labels.included().contains("Action"));
        assert_eq!(state.labels.included().len(), 1);
    }

    #[test]
    fn test_decode_conflict_resolution_prefers_inclusion() {
        let state = decode("cr=safe&ncr=safe,mature", &[], &[]);
        assert!(state.ratings.included().contains("SAFE"));
        assert!(!state.ratings.excluded().contains("SAFE"));
        assert!(state.ratings.excluded().contains("MATURE"));
    }

    #[test]
    fn test_decode_selected_ids_inner_layer() {
        let state = decode("sel=foo%2Cbar&oss=true", &[], &[]);
        assert!(state.selected.contains("foo"));
        assert!(state.selected.contains("bar"));
        assert!(state.show_only_selected);
    }

    #[test]
    fn test_encode_omits_empty_collections() {
        let state = ViewState::default();
        assert_eq!(encode(&state, &[]), "");
    }

    #[test]
    fn test_mode_params_only_with_active_axis() {
        let mut state = ViewState::default();
        state.badge_mode = CombineMode::All;
        assert!(!encode(&state, &[]).contains("bm="));

        state.labels.set_included(["Action".to_string()]);
        let query = encode(&state, &[]);
        assert!(query.contains("bm=and"));
        assert!(!query.contains("sm="));
    }

    #[test]
    fn test_external_repo_urls_for_custom_sources() {
        let mut state = ViewState::default();
        state
            .sources
            .set_included(["inkdex".to_string(), "someone-extensions".to_string()]);

        let sources = vec![RepositorySource::new("someone", "extensions", "gh-pages")];
        let query = encode(&state, &sources);
        assert!(query.contains("ar=https%3A%2F%2Fgithub.com%2Fsomeone%2Fextensions"));
        assert!(!query.contains("tree"));

        let sources = vec![RepositorySource::new("someone", "extensions", "main")];
        let query = encode(&state, &sources);
        assert!(query.contains("tree%2Fmain"));
    }

    #[test]
    fn test_roundtrip_full_state() {
        let languages = vocab(&["en", "ja"]);
        let labels = vocab(&["Action", "Sci-Fi", "Slice of Life"]);

        let mut state = ViewState::default();
        state.search_query = "pirate".to_string();
        state.show_only_selected = true;
        state.selected.insert("inkdex-foo".to_string());
        state.selected.insert("someone-extensions-bar".to_string());
        state.ratings.set_included(["MATURE".to_string()]);
        state.ratings.add_excluded(["ADULT".to_string()]);
        state.languages.set_included(["en".to_string()]);
        state.languages.add_excluded(["ja".to_string()]);
        state
            .labels
            .set_included(["Sci-Fi".to_string(), "Slice of Life".to_string()]);
        state.labels.add_excluded(["Action".to_string()]);
        state
            .services
            .set_included([CONTENT_SERVICE.to_string(), CLOUDFLARE_SERVICE.to_string()]);
        state.sources.set_included(["inkdex".to_string()]);
        state.badge_mode = CombineMode::All;
        state.service_mode = CombineMode::Any;
        state.open_detail = Some("inkdex-foo".to_string());

        let query = encode(&state, &[]);
        let decoded = decode(&query, &languages, &labels);
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_roundtrip_drops_mode_of_emptied_axis() {
        let mut state = ViewState::default();
        state.badge_mode = CombineMode::All;

        let query = encode(&state, &[]);
        let decoded = decode(&query, &[], &[]);
        assert_eq!(decoded.badge_mode, CombineMode::Any);
    }

    #[test]
    fn test_url_sync_noop_when_unchanged() {
        let mut sync = UrlSync::new();
        let mut state = ViewState::default();
        state.search_query = "foo".to_string();

        assert!(sync.sync(&state, &[]).is_some());
        assert!(sync.sync(&state, &[]).is_none());

        state.search_query = "bar".to_string();
        assert_eq!(sync.sync(&state, &[]), Some("s=bar".to_string()));
    }
}
