//! Extension record model and URL templates.

use crate::capabilities::CapabilitySet;
use crate::repos::RepositorySource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Icon shown when an extension declares none.
pub const PLACEHOLDER_ICON: &str = "https://paperback.moe/pb-placeholder.png";

/// Content rating declared by an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentRating {
    Safe,
    Mature,
    Adult,
}

/// All content ratings, in display order.
pub const CONTENT_RATINGS: [ContentRating; 3] = [
    ContentRating::Safe,
    ContentRating::Mature,
    ContentRating::Adult,
];

impl ContentRating {
    /// The wire form, e.g. `"SAFE"`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Mature => "MATURE",
            Self::Adult => "ADULT",
        }
    }
}

impl fmt::Display for ContentRating {
    /// Title-cased form for presentation, e.g. `"Safe"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Safe => "Safe",
            Self::Mature => "Mature",
            Self::Adult => "Adult",
        };
        write!(f, "{label}")
    }
}

impl FromStr for ContentRating {
    type Err = ();

    /// Case-insensitive parse; anything outside the fixed enum is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SAFE" => Ok(Self::Safe),
            "MATURE" => Ok(Self::Mature),
            "ADULT" => Ok(Self::Adult),
            _ => Err(()),
        }
    }
}

/// One badge attached to an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    /// Badge text, also the filterable label key.
    pub label: String,

    /// Foreground color.
    pub text_color: String,

    /// Background color.
    pub background_color: String,
}

/// One developer credited by an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Developer {
    pub name: String,

    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub github: Option<String>,
}

/// Structured metadata for one extension, as published in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub icon: String,
    pub language: Option<String>,
    pub content_rating: ContentRating,

    #[serde(default)]
    pub badges: Vec<Badge>,

    pub capabilities: CapabilitySet,

    #[serde(default)]
    pub developers: Vec<Developer>,
}

/// The remote manifest document listing all extensions of one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub sources: Vec<ExtensionMetadata>,
}

/// One extension in the unified catalog. Identity is `(source_id, id)`.
///
/// Records are rebuilt wholesale on every fetch cycle, never mutated in
/// place.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionRecord {
    /// Extension id within its repository.
    pub id: String,

    /// Id of the repository source this record came from.
    pub source_id: String,

    /// Installable bundle URL.
    pub canonical_url: String,

    /// Human-browsable GitHub URL.
    pub browsable_url: String,

    /// Icon URL, or the placeholder when none is declared.
    pub icon_url: String,

    /// Structured metadata, when the manifest provided it.
    pub metadata: Option<ExtensionMetadata>,
}

impl ExtensionRecord {
    /// Builds a record from one manifest entry.
    #[must_use]
    pub fn from_metadata(repo: &RepositorySource, metadata: ExtensionMetadata) -> Self {
        let icon_url = if metadata.icon.is_empty() {
            PLACEHOLDER_ICON.to_string()
        } else {
            icon_url(repo, &metadata.id, &metadata.icon)
        };

        Self {
            id: metadata.id.clone(),
            source_id: repo.id.clone(),
            canonical_url: canonical_url(repo, &metadata.id),
            browsable_url: browsable_url(repo, &metadata.id),
            icon_url,
            metadata: Some(metadata),
        }
    }

    /// Unique key of this record across all repositories, used by the
    /// selection set and the `sel` URL parameter.
    #[must_use]
    pub fn selection_key(&self) -> String {
        format!("{}-{}", self.source_id, self.id)
    }
}

/// Root of the published bundle tree for one repository.
#[must_use]
pub fn base_url(repo: &RepositorySource) -> String {
    format!(
        "https://raw.githubusercontent.com/{}/{}/{}/0.9/stable",
        repo.owner, repo.name, repo.branch
    )
}

/// URL of the repository's manifest document.
#[must_use]
pub fn manifest_url(repo: &RepositorySource) -> String {
    format!("{}/versioning.json", base_url(repo))
}

/// Installable bundle URL for one extension.
#[must_use]
pub fn canonical_url(repo: &RepositorySource, extension_id: &str) -> String {
    format!("{}/{}/index.js", base_url(repo), extension_id)
}

/// Browsable GitHub tree URL for one extension.
#[must_use]
pub fn browsable_url(repo: &RepositorySource, extension_id: &str) -> String {
    format!(
        "https://github.com/{}/{}/tree/{}/0.9/stable/{}",
        repo.owner, repo.name, repo.branch, extension_id
    )
}

/// Icon URL for one extension's declared icon file.
#[must_use]
pub fn icon_url(repo: &RepositorySource, extension_id: &str, icon: &str) -> String {
    format!(
        "https://{}.github.io/{}/0.9/stable/{}/static/{}",
        repo.owner, repo.name, extension_id, icon
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::CapabilitySet;

    fn repo() -> RepositorySource {
        RepositorySource::new("someone", "extensions", "gh-pages")
    }

    fn metadata(id: &str, icon: &str) -> ExtensionMetadata {
        ExtensionMetadata {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            version: "1.0.0".to_string(),
            icon: icon.to_string(),
            language: None,
            content_rating: ContentRating::Safe,
            badges: Vec::new(),
            capabilities: CapabilitySet::Mask(1),
            developers: Vec::new(),
        }
    }

    #[test]
    fn test_url_templates() {
        let repo = repo();
        assert_eq!(
            manifest_url(&repo),
            "https://raw.githubusercontent.com/someone/extensions/gh-pages/0.9/stable/versioning.json"
        );
        assert_eq!(
            canonical_url(&repo, "foo"),
            "https://raw.githubusercontent.com/someone/extensions/gh-pages/0.9/stable/foo/index.js"
        );
        assert_eq!(
            browsable_url(&repo, "foo"),
            "https://github.com/someone/extensions/tree/gh-pages/0.9/stable/foo"
        );
        assert_eq!(
            icon_url(&repo, "foo", "icon.png"),
            "https://someone.github.io/extensions/0.9/stable/foo/static/icon.png"
        );
    }

    #[test]
    fn test_record_from_metadata() {
        let record = ExtensionRecord::from_metadata(&repo(), metadata("foo", "icon.png"));
        assert_eq!(record.id, "foo");
        assert_eq!(record.source_id, "someone-extensions");
        assert!(record.icon_url.ends_with("foo/static/icon.png"));
    }

    #[test]
    fn test_record_without_icon_uses_placeholder() {
        let record = ExtensionRecord::from_metadata(&repo(), metadata("foo", ""));
        assert_eq!(record.icon_url, PLACEHOLDER_ICON);
    }

    #[test]
    fn test_content_rating_parse_and_display() {
        assert_eq!("safe".parse::<ContentRating>(), Ok(ContentRating::Safe));
        assert_eq!("MATURE".parse::<ContentRating>(), Ok(ContentRating::Mature));
        assert!("spicy".parse::<ContentRating>().is_err());
        assert_eq!(ContentRating::Adult.to_string(), "Adult");
        assert_eq!(ContentRating::Adult.as_str(), "ADULT");
    }

    #[test]
    fn test_manifest_deserializes_wire_format() {
        let manifest: Manifest = serde_json::from_str(
            r##"{"sources": [{
                "id": "foo",
                "name": "Foo",
                "description": "Reads foo",
                "version": "1.2.0",
                "icon": "icon.png",
                "language": "en",
                "contentRating": "SAFE",
                "badges": [{"label": "Action", "textColor": "#fff", "backgroundColor": "#000"}],
                "capabilities": [1, 4],
                "developers": [{"name": "dev"}]
            }]}"##,
        )
        .unwrap();

        let meta = &manifest.sources[0];
        assert_eq!(meta.content_rating, ContentRating::Safe);
        assert_eq!(meta.capabilities, CapabilitySet::Flags(vec![1, 4]));
        assert_eq!(meta.badges[0].label, "Action");
    }
}
