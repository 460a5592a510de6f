//! Pluggable discovery sources for attribute candidates.
//!
//! Mirrors the solver discovery pattern: the registry sees only the
//! [`AttributeSource`] trait, and [`StaticSource`] is the in-process
//! registration table used by embedded deployments and tests.

use std::collections::HashMap;

use crate::descriptor::AttributeCandidate;
use crate::error::AttributeError;


/// A mechanism yielding candidate attribute records for a named group.
pub trait AttributeSource {
    /// Returns the candidates registered under `group`.
    ///
    /// An unknown group yields an empty candidate set, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::Source`] when the source cannot be
    /// scanned.
    fn candidates(&self, group: &str) -> Result<Vec<AttributeCandidate>, AttributeError>;
}

/// In-memory registration table mapping group names to candidate lists.
#[derive(Default, Clone)]
pub struct StaticSource {
    groups: HashMap<String, Vec<AttributeCandidate>>,
}

impl StaticSource {
    /// Creates an empty registration table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a candidate under the given group.
    pub fn register(&mut self, group: impl Into<String>, candidate: AttributeCandidate) {
        self.groups.entry(group.into()).or_default().push(candidate);
    }

    /// Returns the number of candidates registered under `group`.
    #[must_use]
    pub fn len(&self, group: &str) -> usize {
        self.groups.get(group).map_or(0, Vec::len)
    }

    /// Returns `true` when no candidates are registered under `group`.
    #[must_use]
    pub fn is_empty(&self, group: &str) -> bool {
        self.len(group) == 0
    }
}

impl std::fmt::Debug for StaticSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSource")
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AttributeSource for StaticSource {
    fn candidates(&self, group: &str) -> Result<Vec<AttributeCandidate>, AttributeError> {
        Ok(self.groups.get(group).cloned().unwrap_or_default())
    }
}
