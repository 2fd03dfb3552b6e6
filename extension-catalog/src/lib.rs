#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod available;
pub mod cache;
pub mod capabilities;
pub mod catalog;
pub mod filter;
pub mod lang;
pub mod repos;
pub mod session;
pub mod url_state;

pub use available::{language_key, AvailableData};
pub use cache::{CacheEntry, CacheLookup, PersistentCache};
pub use capabilities::{
    CapabilitySet, CLOUDFLARE_BYPASS, CONTENT_PROVIDING, PROGRESS_TRACKING,
};
pub use catalog::{
    merge_cycle, Badge, CatalogError, CatalogFetcher, ContentRating, Developer, ExtensionMetadata,
    ExtensionRecord, Manifest, RepoFetchOutcome, CONTENT_RATINGS,
};
pub use filter::{
    AxisSelection, CombineMode, FilterEngine, SearchDebouncer, ViewState, CLOUDFLARE_SERVICE,
    CONTENT_SERVICE, SERVICE_NAMES, TRACKER_SERVICE,
};
pub use repos::{
    default_sources, detect_branch, parse_repo_input, AddStatus, RepoError, RepoRef, RepoStore,
    RepositorySource, DEFAULT_SOURCE_ID,
};
pub use session::CatalogSession;
pub use url_state::{decode, encode, UrlSync};
