//! Solver manager: instance caching, execution, and history tracking.
//!
//! The [`SolverManager`] owns one registry + planner pair and an injected
//! discovery source. It materializes solver instances through descriptor
//! factories (one cached instance per name), executes them strictly
//! sequentially against a caller-owned model, records invocation history,
//! and aggregates or short-circuits on failure per caller policy.
//!
//! A manager is single-owner mutable state: all execution methods take
//! `&mut self`, so a single manager cannot be driven from two threads at
//! once. Independent managers share nothing.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::descriptor::SolverInfo;
use crate::error::SolverError;
use crate::planner::ExecutionPlanner;
use crate::registry::SolverRegistry;
use crate::solver::Solver;
use crate::source::SolverSource;

#[cfg(test)]
mod tests;

/// Tracing target for manager operations.
const MANAGER_TARGET: &str = "hearth_solvers::manager";

/// Failure policy for batch execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ErrorPolicy {
    /// Propagate the first failure immediately; later solvers do not run.
    FailFast,
    /// Attempt every solver, then report all failures together in one
    /// [`SolverError::Aggregate`].
    #[default]
    Aggregate,
}

impl ErrorPolicy {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::Aggregate => "aggregate",
        }
    }
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering policy for subset execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubsetOrder {
    /// Filter the full plan down to the requested names, preserving the
    /// dependency-consistent relative order.
    #[default]
    Planned,
    /// Execute in exactly the caller-supplied order.
    Requested,
}

impl SubsetOrder {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Requested => "requested",
        }
    }
}

impl std::fmt::Display for SubsetOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a single-solver execution runs the solver's own dependency
/// validator first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DependencyCheck {
    /// Run [`Solver::validate_dependencies`] against the known names and
    /// refuse to execute on any reported deficiency.
    #[default]
    Validate,
    /// Skip validation; used for planned batches, where the planner already
    /// guarantees resolvability.
    Skip,
}

impl DependencyCheck {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Skip => "skip",
        }
    }
}

impl std::fmt::Display for DependencyCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinates solver discovery, instantiation, execution, and history.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use hearth_solvers::descriptor::SolverCandidate;
/// use hearth_solvers::manager::{ErrorPolicy, SolverManager};
/// use hearth_solvers::solver::{SolveError, Solver, SolverPriority};
/// use hearth_solvers::source::StaticSource;
///
/// struct Climate;
///
/// impl Solver<Vec<String>> for Climate {
///     fn name(&self) -> &str {
///         "climate"
///     }
///     fn version(&self) -> &str {
///         "1.0"
///     }
///     fn priority(&self) -> SolverPriority {
///         SolverPriority::Foundation
///     }
///     fn solve(&mut self, model: &mut Vec<String>) -> Result<(), SolveError> {
///         model.push("climate".into());
///         Ok(())
///     }
/// }
///
/// let mut source = StaticSource::new();
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
/// let mut manager = SolverManager::new(source);
/// manager.discover("hearth.solvers").expect("discover");
///
/// let mut model = Vec::new();
/// manager
///     .execute_all(&mut model, ErrorPolicy::default())
///     .expect("execute");
/// assert_eq!(model, vec!["climate".to_owned()]);
/// assert_eq!(manager.history(), vec!["climate".to_owned()]);
/// ```
pub struct SolverManager<M, S> {
    registry: SolverRegistry<M>,
    planner: ExecutionPlanner,
    source: S,
    instances: HashMap<String, Box<dyn Solver<M>>>,
    history: Vec<String>,
}

impl<M, S: SolverSource<M>> SolverManager<M, S> {
    /// Creates a manager with an empty registry around the given discovery
    /// source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            registry: SolverRegistry::new(),
            planner: ExecutionPlanner::new(),
            source,
            instances: HashMap::new(),
            history: Vec::new(),
        }
    }

    /// Discovers solvers under `group`, replacing all prior registry state.
    ///
    /// Any discovery attempt — successful or not — invalidates the cached
    /// plan and clears the instance cache and execution history; the
    /// planner recomputes lazily on the next order request.
    ///
    /// # Errors
    ///
    /// Propagates [`SolverError::ProtocolViolation`] and
    /// [`SolverError::Source`] from the registry scan.
    pub fn discover(&mut self, group: &str) -> Result<(), SolverError> {
        let outcome = self.registry.discover(&self.source, group);
        self.planner.invalidate();
        self.instances.clear();
        self.history.clear();
        outcome
    }

    /// Returns the cached instance for `name`, invoking the descriptor's
    /// factory on first use.
    ///
    /// Repeated calls return the same object until [`reset`](Self::reset)
    /// or [`discover`](Self::discover) clears the cache.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::NotDiscovered`] / [`SolverError::NotFound`]
    /// from descriptor lookup, or [`SolverError::Instantiation`] when the
    /// factory fails.
    pub fn instance(&mut self, name: &str) -> Result<&mut dyn Solver<M>, SolverError> {
        match self.instances.entry(name.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_mut()),
            Entry::Vacant(entry) => {
                let descriptor = self.registry.get(name)?;
                let built =
                    descriptor
                        .instantiate()
                        .map_err(|cause| SolverError::Instantiation {
                            name: name.to_owned(),
                            source: Arc::from(cause),
                        })?;
                debug!(target: MANAGER_TARGET, solver = name, "solver instantiated");
                Ok(entry.insert(built).as_mut())
            }
        }
    }

    /// Executes a single solver against the model.
    ///
    /// With [`DependencyCheck::Validate`], the solver's own
    /// [`Solver::validate_dependencies`] runs first against the set of all
    /// currently known names (registration, not execution history). On
    /// success the solver name is appended to the execution history; a
    /// failed solver stays cached but is not recorded.
    ///
    /// # Errors
    ///
    /// Instance-resolution errors, [`SolverError::DependencyValidation`]
    /// when the solver's validator reports deficiencies, or
    /// [`SolverError::Execution`] wrapping whatever the solver body raised.
    pub fn execute_one(
        &mut self,
        name: &str,
        model: &mut M,
        check: DependencyCheck,
    ) -> Result<(), SolverError> {
        let known: BTreeSet<String> = self.registry.solver_names();
        let instance = self.instance(name)?;

        if check == DependencyCheck::Validate {
            let problems = instance.validate_dependencies(&known);
            if !problems.is_empty() {
                return Err(SolverError::DependencyValidation {
                    name: name.to_owned(),
                    problems,
                });
            }
        }

        match instance.solve(model) {
            Ok(()) => {
                debug!(target: MANAGER_TARGET, solver = name, "solver executed");
                self.history.push(name.to_owned());
                Ok(())
            }
            Err(cause) => {
                warn!(target: MANAGER_TARGET, solver = name, error = %cause, "solver failed");
                let message = cause.to_string();
                Err(SolverError::Execution {
                    name: name.to_owned(),
                    message,
                    source: Arc::from(cause),
                })
            }
        }
    }

    /// Executes every registered solver in planned order.
    ///
    /// Per-solver dependency validation is skipped; planning already
    /// guarantees resolvability. Under [`ErrorPolicy::FailFast`] the first
    /// failure propagates immediately and history reflects only the solvers
    /// that ran before it. Under [`ErrorPolicy::Aggregate`] every solver is
    /// attempted and all failures are reported together; successes remain
    /// in history and in the mutated model.
    ///
    /// # Errors
    ///
    /// Planning errors, a single [`SolverError::Execution`] under
    /// `FailFast`, or one [`SolverError::Aggregate`] under `Aggregate`.
    pub fn execute_all(&mut self, model: &mut M, policy: ErrorPolicy) -> Result<(), SolverError> {
        let order = self.planner.execution_order(&self.registry)?;
        info!(
            target: MANAGER_TARGET,
            count = order.len(),
            policy = %policy,
            "executing all solvers"
        );
        self.execute_sequence(&order, model, policy)
    }

    /// Executes the requested solvers only.
    ///
    /// Every requested name must be registered; an unknown name fails fast
    /// with [`SolverError::NotFound`] citing all known names, before
    /// anything executes. [`SubsetOrder::Planned`] filters the full plan
    /// down to the requested names; [`SubsetOrder::Requested`] runs them in
    /// the caller-supplied order. Failure handling follows `policy` exactly
    /// as in [`execute_all`](Self::execute_all).
    ///
    /// # Errors
    ///
    /// [`SolverError::NotDiscovered`], [`SolverError::NotFound`], planning
    /// errors (in `Planned` mode), or execution failures per `policy`.
    pub fn execute_subset(
        &mut self,
        names: &[&str],
        model: &mut M,
        order: SubsetOrder,
        policy: ErrorPolicy,
    ) -> Result<(), SolverError> {
        if !self.registry.is_discovered() {
            return Err(SolverError::NotDiscovered);
        }
        for &name in names {
            if !self.registry.contains(name) {
                return Err(SolverError::NotFound {
                    name: name.to_owned(),
                    known: self.registry.known_names(),
                });
            }
        }

        let sequence: Vec<String> = match order {
            SubsetOrder::Planned => {
                let requested: BTreeSet<&str> = names.iter().copied().collect();
                self.planner
                    .execution_order(&self.registry)?
                    .into_iter()
                    .filter(|name| requested.contains(name.as_str()))
                    .collect()
            }
            SubsetOrder::Requested => names.iter().map(|&name| name.to_owned()).collect(),
        };
        info!(
            target: MANAGER_TARGET,
            count = sequence.len(),
            order = %order,
            policy = %policy,
            "executing solver subset"
        );
        self.execute_sequence(&sequence, model, policy)
    }

    /// Returns the planned execution order for all registered solvers.
    ///
    /// # Errors
    ///
    /// Same failure modes as
    /// [`ExecutionPlanner::execution_order`].
    pub fn execution_order(&mut self) -> Result<Vec<String>, SolverError> {
        self.planner.execution_order(&self.registry)
    }

    /// Returns the names of solvers executed so far, in invocation order.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.clone()
    }

    /// Clears the execution history without touching the instance cache.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Clears the instance cache and execution history.
    ///
    /// Registered descriptors and the cached plan survive; a subsequent
    /// batch run re-instantiates solvers and rebuilds history from empty.
    pub fn reset(&mut self) {
        self.instances.clear();
        self.history.clear();
    }

    /// Returns the names of all executable solvers, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::NotDiscovered`] before the first discovery.
    pub fn available_solvers(&self) -> Result<Vec<String>, SolverError> {
        Ok(self
            .registry
            .list()?
            .into_iter()
            .map(|descriptor| descriptor.name().to_owned())
            .collect())
    }

    /// Returns a metadata snapshot for one solver.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`SolverRegistry::get`].
    pub fn solver_info(&self, name: &str) -> Result<SolverInfo, SolverError> {
        self.registry.info(name)
    }

    /// Returns a reference to the owned registry.
    #[must_use]
    pub const fn registry(&self) -> &SolverRegistry<M> {
        &self.registry
    }

    fn execute_sequence(
        &mut self,
        order: &[String],
        model: &mut M,
        policy: ErrorPolicy,
    ) -> Result<(), SolverError> {
        let mut failures = Vec::new();
        for name in order {
            if let Err(failure) = self.execute_one(name, model, DependencyCheck::Skip) {
                match policy {
                    ErrorPolicy::FailFast => return Err(failure),
                    ErrorPolicy::Aggregate => failures.push(failure),
                }
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(SolverError::Aggregate { failures })
        }
    }
}

impl<M, S> std::fmt::Debug for SolverManager<M, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverManager")
            .field("registry", &self.registry)
            .field("cached_instances", &self.instances.len())
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}
