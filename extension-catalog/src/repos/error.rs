//! Repository management error types.

use thiserror::Error;

/// Errors that can occur while managing repository sources.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The user-supplied repository reference could not be parsed.
    #[error("Invalid repository '{input}'. Use owner/name or https://github.com/owner/name")]
    InvalidInput { input: String },
}
