//! Cache volume naming and sharing policy
//!
//! Cache volumes are the only state shared across independent pipeline runs.
//! Reuse depends entirely on deterministic naming: the same semantic purpose
//! and scope must resolve to the same volume name in every process, so all
//! name derivation goes through [`slugify`] and [`volume_scoped`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Concurrency policy for a cache volume, honored by the container engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharingMode {
    /// Not intended for concurrent cross-pipeline use
    #[default]
    Exclusive,
    /// Concurrent readers and writers allowed; contents must be merge-safe
    Shared,
    /// At most one writer at a time, other writers queue
    Locked,
}

impl fmt::Display for SharingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclusive => write!(f, "exclusive"),
            Self::Shared => write!(f, "shared"),
            Self::Locked => write!(f, "locked"),
        }
    }
}

/// A named, persistent cache volume reusable across pipeline runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheVolumeRef {
    /// Stable volume name, derived from purpose and scope
    pub name: String,
    /// Sharing policy declared at acquisition time
    pub sharing: SharingMode,
}

impl CacheVolumeRef {
    /// Set the sharing policy on this volume reference
    pub fn with_sharing(self, sharing: SharingMode) -> Self {
        Self { sharing, ..self }
    }
}

/// Normalize an arbitrary string into a path-safe, host-safe identifier.
///
/// Lower-cases the input and collapses every run of non-alphanumeric
/// characters into a single hyphen, trimming hyphens at both ends.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Resolve a cache volume for a semantic purpose, with exclusive sharing.
pub fn volume(purpose: &str) -> CacheVolumeRef {
    CacheVolumeRef {
        name: purpose.to_string(),
        sharing: SharingMode::default(),
    }
}

/// Resolve a cache volume for a purpose scoped by a discriminator.
///
/// The discriminator is slugified so caller-provided casing or punctuation
/// never produces a second volume for the same logical scope.
pub fn volume_scoped(purpose: &str, scope: &str) -> CacheVolumeRef {
    CacheVolumeRef {
        name: format!("{}-{}", purpose, slugify(scope)),
        sharing: SharingMode::default(),
    }
}
