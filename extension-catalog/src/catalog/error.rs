//! Catalog fetch error types.

use thiserror::Error;

/// Errors from fetching one repository's manifest.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Manifest endpoint returned a non-success status.
    #[error("Manifest request returned status {status}")]
    Status { status: u16 },

    /// Manifest body was not valid manifest JSON.
    #[error("Malformed manifest: {0}")]
    Malformed(#[from] serde_json::Error),
}
