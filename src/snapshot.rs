//! Filtered repository snapshots
//!
//! A [`RepoSnapshot`] describes an immutable view of a source subtree:
//! a path relative to the repository root plus include/exclude globs.
//! The container engine materializes the view when a spec mounting it is
//! executed; nothing is read locally at construction time.

use serde::{Deserialize, Serialize};

/// An immutable, filtered view of a repository subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSnapshot {
    /// Path relative to the repository root ("." for the whole tree)
    pub path: String,
    /// Glob allow-list; empty means everything under `path`
    pub include: Vec<String>,
    /// Glob deny-list, applied after includes
    pub exclude: Vec<String>,
}

impl RepoSnapshot {
    /// Snapshot of the subtree at `path` with no filtering
    pub fn subtree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Restrict the snapshot to an explicit allow-list of globs
    pub fn with_include(self, include: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// Exclude paths matching the given globs
    pub fn with_exclude(self, exclude: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            exclude: exclude.into_iter().map(Into::into).collect(),
            ..self
        }
    }
}
