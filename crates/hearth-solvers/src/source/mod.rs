//! Pluggable discovery sources for solver candidates.
//!
//! The concrete mechanism that turns a named group into loadable solvers is
//! deployment-specific: a static registration table, a configuration file,
//! or a runtime plugin loader. The registry only sees the [`SolverSource`]
//! trait, so its discovery logic is independent of any particular loading
//! mechanism. [`StaticSource`] is the in-process registration table used by
//! embedded deployments and tests.

use std::collections::HashMap;

use crate::descriptor::SolverCandidate;
use crate::error::SolverError;


/// A mechanism yielding candidate solver records for a named group.
pub trait SolverSource<M> {
    /// Returns the candidates registered under `group`.
    ///
    /// An unknown group yields an empty candidate set, not an error; only a
    /// failure of the source machinery itself is reported.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Source`] when the source cannot be scanned.
    fn candidates(&self, group: &str) -> Result<Vec<SolverCandidate<M>>, SolverError>;
}

/// In-memory registration table mapping group names to candidate lists.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use hearth_solvers::descriptor::SolverCandidate;
/// use hearth_solvers::solver::{SolveError, Solver, SolverPriority};
/// use hearth_solvers::source::{SolverSource, StaticSource};
///
/// struct Climate;
///
/// impl Solver<()> for Climate {
///     fn name(&self) -> &str {
///         "climate"
///     }
///     fn version(&self) -> &str {
///         "1.0"
///     }
///     fn priority(&self) -> SolverPriority {
///         SolverPriority::Foundation
///     }
///     fn solve(&mut self, _model: &mut ()) -> Result<(), SolveError> {
///         Ok(())
///     }
/// }
///
/// let mut source: StaticSource<()> = StaticSource::new();
/// source.register(
///     "hearth.solvers",
///     SolverCandidate::new("climate-entry")
///         .with_name("climate")
///         .with_version("1.0")
///         .with_priority(SolverPriority::Foundation)
///         .with_depends_on(Vec::new())
///         .with_factory(Arc::new(|| Ok(Box::new(Climate)))),
/// );
///
/// let found = source.candidates("hearth.solvers").expect("scan");
/// assert_eq!(found.len(), 1);
/// assert!(source.candidates("other.group").expect("scan").is_empty());
/// ```
pub struct StaticSource<M> {
    groups: HashMap<String, Vec<SolverCandidate<M>>>,
}

impl<M> StaticSource<M> {
    /// Creates an empty registration table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }

    /// Registers a candidate under the given group.
    pub fn register(&mut self, group: impl Into<String>, candidate: SolverCandidate<M>) {
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

impl<M> Default for StaticSource<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for StaticSource<M> {
    fn clone(&self) -> Self {
        Self {
            groups: self.groups.clone(),
        }
    }
}

impl<M> std::fmt::Debug for StaticSource<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSource")
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<M> SolverSource<M> for StaticSource<M> {
    fn candidates(&self, group: &str) -> Result<Vec<SolverCandidate<M>>, SolverError> {
        Ok(self.groups.get(group).cloned().unwrap_or_default())
    }
}
