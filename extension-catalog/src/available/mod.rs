//! Vocabularies derived from the loaded catalog.
//!
//! The language and badge label filter options are computed from the
//! records currently loaded, not from a fixed list. Both lists are
//! memoized on a key derived from the record identities so they are only
//! recomputed when the catalog itself changed.

use crate::catalog::ExtensionRecord;
use crate::lang;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// The filterable language key for a raw metadata language value.
///
/// Known canonical tags (and `multi`) surface normalized; anything else
/// passes through as the original trimmed label. Records with no language
/// have no key and never match a non-empty language selection.
#[must_use]
pub fn language_key(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let normalized = lang::normalize(Some(raw));
    if lang::is_known_tag(&normalized) {
        Some(normalized)
    } else {
        Some(raw.to_string())
    }
}

/// Memoized available-language and available-label lists.
#[derive(Debug, Default)]
pub struct AvailableData {
    languages: Vec<String>,
    labels: Vec<String>,
    memo_key: String,
}

impl AvailableData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes both vocabularies if the record set changed.
    pub fn refresh(&mut self, records: &[ExtensionRecord]) {
        let key = memo_key(records);
        if key == self.memo_key && !self.memo_key.is_empty() {
            return;
        }

        self.languages = compute_languages(records);
        self.labels = compute_labels(records);
        self.memo_key = key;
    }

    /// Language keys present in the catalog, `multi` first, known tags
    /// before passthrough labels, alphabetical within each group.
    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Badge labels present in the catalog, sorted.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Change-detection key over record identities.
fn memo_key(records: &[ExtensionRecord]) -> String {
    let mut pairs: Vec<String> = records
        .iter()
        .map(|record| format!("{}-{}", record.source_id, record.id))
        .collect();
    pairs.sort();
    pairs.join("|")
}

fn compute_languages(records: &[ExtensionRecord]) -> Vec<String> {
    let keys: BTreeSet<String> = records
        .iter()
        .filter_map(|record| {
            language_key(record.metadata.as_ref().and_then(|m| m.language.as_deref()))
        })
        .collect();

    let mut languages: Vec<String> = keys.into_iter().collect();
    languages.sort_by(|a, b| {
        let a_lower = a.to_lowercase();
        let b_lower = b.to_lowercase();

        // Multi always first.
        if a_lower == lang::MULTI_TAG {
            return Ordering::Less;
        }
        if b_lower == lang::MULTI_TAG {
            return Ordering::Greater;
        }

        // Known tags before passthrough labels.
        match (lang::is_known_tag(&a_lower), lang::is_known_tag(&b_lower)) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a_lower.cmp(&b_lower),
        }
    });

    languages
}

fn compute_labels(records: &[ExtensionRecord]) -> Vec<String> {
    let labels: BTreeSet<String> = records
        .iter()
        .filter_map(|record| record.metadata.as_ref())
        .flat_map(|meta| meta.badges.iter())
        .filter(|badge| !badge.label.trim().is_empty())
        .map(|badge| badge.label.clone())
        .collect();

    labels.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::CapabilitySet;
    use crate::catalog::{Badge, ContentRating, ExtensionMetadata};
    use crate::repos::RepositorySource;

    fn record(id: &str, language: Option<&str>, labels: &[&str]) -> ExtensionRecord {
        let repo = RepositorySource::new("someone", "extensions", "main");
        ExtensionRecord::from_metadata(
            &repo,
            ExtensionMetadata {
                id: id.to_string(),
                name: id.to_string(),
                description: String::new(),
                version: "1.0.0".to_string(),
                icon: String::new(),
                language: language.map(str::to_string),
                content_rating: ContentRating::Safe,
                badges: labels
                    .iter()
                    .map(|label| Badge {
                        label: (*label).to_string(),
                        text_color: "#fff".to_string(),
                        background_color: "#000".to_string(),
                    })
                    .collect(),
                capabilities: CapabilitySet::Mask(1),
                developers: Vec::new(),
            },
        )
    }

    #[test]
    fn test_language_key_normalizes_known_tags() {
        assert_eq!(language_key(Some("English")), Some("en".to_string()));
        assert_eq!(language_key(Some("ALL")), Some("multi".to_string()));
        assert_eq!(language_key(Some("Elvish")), Some("Elvish".to_string()));
        assert_eq!(language_key(None), None);
        assert_eq!(language_key(Some("  ")), None);
    }

    #[test]
    fn test_language_ordering() {
        let records = vec![
            record("a", Some("Elvish"), &[]),
            record("b", Some("ja"), &[]),
            record("c", Some("multi"), &[]),
            record("d", Some("en"), &[]),
        ];

        let mut available = AvailableData::new();
        available.refresh(&records);

        assert_eq!(available.languages(), ["multi", "en", "ja", "Elvish"]);
    }

    #[test]
    fn test_labels_sorted_and_deduplicated() {
        let records = vec![
            record("a", None, &["Drama", "Action"]),
            record("b", None, &["Action", "  "]),
        ];

        let mut available = AvailableData::new();
        available.refresh(&records);

        assert_eq!(available.labels(), ["Action", "Drama"]);
    }

    #[test]
    fn test_refresh_is_memoized() {
        let records = vec![record("a", Some("en"), &["Action"])];
        let mut available = AvailableData::new();
        available.refresh(&records);

        // Same identities with different metadata: memo key unchanged, so
        // the cached vocabularies are kept.
        let altered = vec![record("a", Some("ja"), &["Drama"])];
        available.refresh(&altered);
        assert_eq!(available.languages(), ["en"]);

        let grown = vec![
            record("a", Some("en"), &["Action"]),
            record("b", Some("ja"), &[]),
        ];
        available.refresh(&grown);
        assert_eq!(available.languages(), ["en", "ja"]);
    }
}
