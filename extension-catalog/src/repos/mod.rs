//! Repository source management.
//!
//! A repository source is one GitHub repository publishing extension
//! manifests. The default source list is built in; user-added sources are
//! persisted as a flat JSON array and survive restarts. Adding a source
//! accepts either a bare `owner/name` slug or a full GitHub URL (optionally
//! with a `/tree/branch` segment) and auto-detects the publishing branch.

mod error;

pub use error::RepoError;

use octocrab::params::repos::Reference;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the persisted custom source list inside the data directory.
const REPOS_FILE: &str = "repositories.json";

/// Identity of the built-in default source.
pub const DEFAULT_SOURCE_ID: &str = "inkdex";

/// Branch name probed first when auto-detecting where a repository
/// publishes its manifests.
const PUBLISHING_BRANCH: &str = "gh-pages";

/// Fallback branch when the default-branch lookup fails.
const FALLBACK_BRANCH: &str = "main";

/// One extension repository the catalog is aggregated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySource {
    /// Stable identity, `owner-name` (or the fixed default id).
    pub id: String,

    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,

    /// Branch the manifests are published on.
    pub branch: String,

    /// Human-readable `owner/name` label.
    pub display_name: String,
}

impl RepositorySource {
    /// Builds a source from its parts, deriving id and display name.
    #[must_use]
    pub fn new(owner: &str, name: &str, branch: &str) -> Self {
        Self {
            id: format!("{owner}-{name}"),
            owner: owner.to_string(),
            name: name.to_string(),
            branch: branch.to_string(),
            display_name: format!("{owner}/{name}"),
        }
    }
}

/// The built-in default source list.
#[must_use]
pub fn default_sources() -> Vec<RepositorySource> {
    vec![RepositorySource {
        id: DEFAULT_SOURCE_ID.to_string(),
        owner: "inkdex".to_string(),
        name: "extensions".to_string(),
        branch: "master".to_string(),
        display_name: "inkdex/extensions".to_string(),
    }]
}

/// Outcome of an add operation. Re-adding an existing id is a no-op
/// success rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddStatus {
    /// The source was added and persisted.
    Added(RepositorySource),

    /// A source with the same id already existed; nothing changed.
    AlreadyAdded(RepositorySource),
}

impl AddStatus {
    /// The source this operation resolved to, added or pre-existing.
    #[must_use]
    pub fn source(&self) -> &RepositorySource {
        match self {
            Self::Added(source) | Self::AlreadyAdded(source) => source,
        }
    }
}

/// Persisted store of user-added repository sources.
#[derive(Debug)]
pub struct RepoStore {
    custom: Vec<RepositorySource>,
    path: Option<PathBuf>,
}

impl RepoStore {
    /// Loads the custom source list from `data_dir`.
    ///
    /// A corrupt list is discarded and the corrupt file removed, so the
    /// next save starts from a clean slate.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(REPOS_FILE);
        let custom = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(custom) => custom,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt repository list, discarding");
                    let _ = std::fs::remove_file(&path);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self {
            custom,
            path: Some(path),
        }
    }

    /// Creates a store with no backing file.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            custom: Vec::new(),
            path: None,
        }
    }

    /// User-added sources only.
    #[must_use]
    pub fn custom(&self) -> &[RepositorySource] {
        &self.custom
    }

    /// Defaults followed by user-added sources.
    #[must_use]
    pub fn all(&self) -> Vec<RepositorySource> {
        let mut all = default_sources();
        all.extend(self.custom.iter().cloned());
        all
    }

    /// Looks up a source (default or custom) by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<RepositorySource> {
        self.all().into_iter().find(|source| source.id == id)
    }

    /// Adds a custom source and persists the complete list.
    ///
    /// Returns [`AddStatus::AlreadyAdded`] without touching storage when a
    /// source with the same id exists (default or custom).
    pub fn insert(&mut self, source: RepositorySource) -> AddStatus {
        if let Some(existing) = self.find(&source.id) {
            debug!(id = %source.id, "Repository already present, no-op");
            return AddStatus::AlreadyAdded(existing);
        }

        self.custom.push(source.clone());
        self.persist();
        AddStatus::Added(source)
    }

    /// Removes a custom source by id and persists. Returns whether an
    /// entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|source| source.id != id);
        let removed = self.custom.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Writes the complete custom list to disk. Failures are logged and
    /// swallowed; the in-memory list stays authoritative for the session.
    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };

        let serialized = match serde_json::to_string(&self.custom) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize repository list");
                return;
            }
        };

        if let Err(e) = std::fs::write(path, serialized) {
            warn!(path = %path.display(), error = %e, "Failed to persist repository list");
        }
    }
}

/// A parsed `owner/name` reference with an optional explicit branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner.
    pub owner: String,

    /// Repository name, `.git` suffix stripped.
    pub name: String,

    /// Branch from a `/tree/branch` URL segment, if present.
    pub branch: Option<String>,
}

/// Parses a bare `owner/name` slug or a GitHub URL.
///
/// # Errors
///
/// Returns [`RepoError::InvalidInput`] when no owner/name pair can be
/// extracted.
pub fn parse_repo_input(input: &str) -> Result<RepoRef, RepoError> {
    let trimmed = input.trim();

    let (owner, name, branch) = if let Some(rest) = trimmed
        .find("github.com/")
        .map(|idx| &trimmed[idx + "github.com/".len()..])
    {
        let parts: Vec<&str> = rest.split('/').filter(|part| !part.is_empty()).collect();
        let branch = match (parts.get(2), parts.get(3)) {
            (Some(&"tree"), Some(branch)) => Some((*branch).to_string()),
            _ => None,
        };
        (
            parts.first().copied().unwrap_or_default(),
            parts.get(1).copied().unwrap_or_default(),
            branch,
        )
    } else if trimmed.contains('/') {
        let parts: Vec<&str> = trimmed.split('/').collect();
        (
            parts.first().copied().unwrap_or_default(),
            parts.get(1).copied().unwrap_or_default(),
            None,
        )
    } else {
        ("", "", None)
    };

    if owner.is_empty() || name.is_empty() {
        return Err(RepoError::InvalidInput {
            input: input.to_string(),
        });
    }

    Ok(RepoRef {
        owner: owner.to_string(),
        name: name.trim_end_matches(".git").to_string(),
        branch,
    })
}

/// Checks whether `branch` exists in the repository. Lookup failures count
/// as absent.
pub async fn branch_exists(octocrab: &Octocrab, owner: &str, name: &str, branch: &str) -> bool {
    octocrab
        .repos(owner, name)
        .get_ref(&Reference::Branch(branch.to_string()))
        .await
        .is_ok()
}

/// Fetches the repository's default branch, falling back to
/// [`FALLBACK_BRANCH`] on any failure.
pub async fn default_branch(octocrab: &Octocrab, owner: &str, name: &str) -> String {
    match octocrab.repos(owner, name).get().await {
        Ok(repo) => repo
            .default_branch
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string()),
        Err(e) => {
            warn!(owner, name, error = %e, "Failed to look up default branch, using fallback");
            FALLBACK_BRANCH.to_string()
        }
    }
}

/// Resolves the branch a repository publishes on.
///
/// Prefers the explicit branch from the parsed reference, then the known
/// publishing branch if it exists, then the remote default branch.
pub async fn detect_branch(octocrab: &Octocrab, repo_ref: &RepoRef) -> String {
    if let Some(branch) = &repo_ref.branch {
        return branch.clone();
    }

    if branch_exists(octocrab, &repo_ref.owner, &repo_ref.name, PUBLISHING_BRANCH).await {
        info!(owner = %repo_ref.owner, name = %repo_ref.name, "Publishing branch found");
        return PUBLISHING_BRANCH.to_string();
    }

    default_branch(octocrab, &repo_ref.owner, &repo_ref.name).await
}
