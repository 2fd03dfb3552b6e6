//! Capability flag decoding.
//!
//! Extension metadata declares its capabilities either as a single bitmask
//! integer or as an explicit list of set-bit integers, depending on the
//! producer version. The predicates here are agnostic to which
//! representation was emitted.

use serde::{Deserialize, Serialize};

/// Bit for extensions that provide chapter content.
pub const CONTENT_PROVIDING: u32 = 1;

/// Bit for extensions that provide reading progress tracking.
pub const PROGRESS_TRACKING: u32 = 2;

/// Bit for extensions that can bypass a Cloudflare challenge.
pub const CLOUDFLARE_BYPASS: u32 = 4;

/// Capability declaration as found in extension metadata.
///
/// Deserializes from either a bare integer bitmask (`5`) or a list of flag
/// values (`[1, 4]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilitySet {
    /// All flags packed into one bitmask.
    Mask(u32),

    /// Each set flag listed individually.
    Flags(Vec<u32>),
}

impl CapabilitySet {
    /// Tests whether `flag` is declared in this capability set.
    #[must_use]
    pub fn has(&self, flag: u32) -> bool {
        match self {
            Self::Mask(mask) => mask & flag == flag,
            Self::Flags(flags) => flags.contains(&flag),
        }
    }

    /// True if the extension provides chapter content.
    #[must_use]
    pub fn provides_content(&self) -> bool {
        self.has(CONTENT_PROVIDING)
    }

    /// True if the extension provides reading progress tracking.
    #[must_use]
    pub fn provides_tracking(&self) -> bool {
        self.has(PROGRESS_TRACKING)
    }

    /// True if the extension can bypass a Cloudflare challenge.
    #[must_use]
    pub fn bypasses_cloudflare(&self) -> bool {
        self.has(CLOUDFLARE_BYPASS)
    }
}
