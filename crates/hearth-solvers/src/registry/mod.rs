//! Solver registry: discovery, candidate validation, and descriptor lookup.
//!
//! The [`SolverRegistry`] turns a discovery source into a validated,
//! queryable set of [`SolverDescriptor`]s keyed by solver name. Discovery is
//! fail-fast: one rejected candidate aborts the whole scan and the registry
//! stays undiscovered. The registry stores descriptors only; execution order
//! is the planner's concern.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::descriptor::{SolverDescriptor, SolverInfo};
use crate::error::SolverError;
use crate::source::SolverSource;


/// Tracing target for registry operations.
const REGISTRY_TARGET: &str = "hearth_solvers::registry";

/// Validated, queryable set of solver descriptors.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use hearth_solvers::descriptor::SolverCandidate;
/// use hearth_solvers::registry::SolverRegistry;
/// use hearth_solvers::solver::{SolveError, Solver, SolverPriority};
/// use hearth_solvers::source::StaticSource;
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
/// let mut registry = SolverRegistry::new();
/// registry.discover(&source, "hearth.solvers").expect("discover");
/// assert_eq!(registry.get("climate").expect("get").version(), "1.0");
/// ```
pub struct SolverRegistry<M> {
    descriptors: HashMap<String, SolverDescriptor<M>>,
    discovered: bool,
}

impl<M> SolverRegistry<M> {
    /// Creates an empty, undiscovered registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
            discovered: false,
        }
    }

    /// Scans `source` for candidates under `group` and registers every
    /// validated descriptor, keyed by declared name.
    ///
    /// All prior descriptors are cleared first, regardless of outcome.
    /// Candidates are validated in source order; a later candidate declaring
    /// an already-registered name overwrites the earlier entry. Discovery
    /// does not compute execution order.
    ///
    /// # Errors
    ///
    /// Fail-fast: the first [`SolverError::ProtocolViolation`] or
    /// [`SolverError::Source`] aborts the whole call, leaving the registry
    /// empty and undiscovered.
    pub fn discover<S>(&mut self, source: &S, group: &str) -> Result<(), SolverError>
    where
        S: SolverSource<M> + ?Sized,
    {
        self.descriptors.clear();
        self.discovered = false;

        for candidate in source.candidates(group)? {
            let descriptor = candidate.into_descriptor()?;
            debug!(
                target: REGISTRY_TARGET,
                solver = descriptor.name(),
                tier = %descriptor.priority(),
                "registered solver"
            );
            self.descriptors
                .insert(descriptor.name().to_owned(), descriptor);
        }

        self.discovered = true;
        info!(
            target: REGISTRY_TARGET,
            group,
            count = self.descriptors.len(),
            "solver discovery complete"
        );
        Ok(())
    }

    /// Looks up a descriptor by solver name.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::NotDiscovered`] before the first successful
    /// discovery, or [`SolverError::NotFound`] listing the known names.
    pub fn get(&self, name: &str) -> Result<&SolverDescriptor<M>, SolverError> {
        self.ensure_discovered()?;
        self.descriptors
            .get(name)
            .ok_or_else(|| SolverError::NotFound {
                name: name.to_owned(),
                known: self.known_names(),
            })
    }

    /// Returns all descriptors, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::NotDiscovered`] before the first successful
    /// discovery.
    pub fn list(&self) -> Result<Vec<&SolverDescriptor<M>>, SolverError> {
        self.ensure_discovered()?;
        let mut descriptors: Vec<&SolverDescriptor<M>> = self.descriptors.values().collect();
        descriptors.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(descriptors)
    }

    /// Returns a metadata snapshot for one solver.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`SolverRegistry::get`].
    pub fn info(&self, name: &str) -> Result<SolverInfo, SolverError> {
        self.get(name).map(SolverDescriptor::info)
    }

    /// Returns metadata snapshots for all solvers, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::NotDiscovered`] before the first successful
    /// discovery.
    pub fn infos(&self) -> Result<Vec<SolverInfo>, SolverError> {
        Ok(self.list()?.into_iter().map(SolverDescriptor::info).collect())
    }

    /// Returns the set of currently registered solver names.
    #[must_use]
    pub fn solver_names(&self) -> BTreeSet<String> {
        self.descriptors.keys().cloned().collect()
    }

    /// Returns the names of solvers that declare a dependency on `name`,
    /// sorted lexicographically.
    ///
    /// The reverse index is derived on demand from the descriptor set.
    #[must_use]
    pub fn dependents_of(&self, name: &str) -> Vec<String> {
        let mut dependents: Vec<String> = self
            .descriptors
            .values()
            .filter(|descriptor| descriptor.depends_on().contains(name))
            .map(|descriptor| descriptor.name().to_owned())
            .collect();
        dependents.sort_unstable();
        dependents
    }

    /// Returns `true` when a solver with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Returns the number of registered solvers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` when no solvers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Returns `true` once a discovery call has completed successfully.
    #[must_use]
    pub const fn is_discovered(&self) -> bool {
        self.discovered
    }

    fn ensure_discovered(&self) -> Result<(), SolverError> {
        if self.discovered {
            Ok(())
        } else {
            Err(SolverError::NotDiscovered)
        }
    }

    pub(crate) fn known_names(&self) -> Vec<String> {
        let mut known: Vec<String> = self.descriptors.keys().cloned().collect();
        known.sort_unstable();
        known
    }
}

impl<M> Default for SolverRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for SolverRegistry<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverRegistry")
            .field("solvers", &self.known_names())
            .field("discovered", &self.discovered)
            .finish()
    }
}
