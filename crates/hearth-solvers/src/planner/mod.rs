//! Execution planning: priority-tiered topological sort with cycle
//! detection.
//!
//! The [`ExecutionPlanner`] consumes the registry's descriptor set and
//! produces a total order over solver names in which every tier fully
//! precedes later tiers and every dependency precedes its dependent.
//! Unresolvable dependencies, dependency edges pointing into a later tier,
//! and dependency cycles are all rejected before any order is produced.
//! The computed plan is memoized until [`ExecutionPlanner::invalidate`] is
//! called.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::descriptor::SolverDescriptor;
use crate::error::{MissingDependency, SolverError, TierViolation};
use crate::registry::SolverRegistry;
use crate::solver::SolverPriority;


/// Tracing target for planner operations.
const PLANNER_TARGET: &str = "hearth_solvers::planner";

/// Computes and caches a valid solver execution order.
///
/// The planner holds no descriptors of its own; it reads the registry on
/// each recomputation. Whoever mutates the registry is responsible for
/// calling [`ExecutionPlanner::invalidate`] (the manager does this on every
/// discovery).
///
/// # Example
///
/// ```
/// use hearth_solvers::planner::ExecutionPlanner;
/// use hearth_solvers::registry::SolverRegistry;
///
/// let mut registry: SolverRegistry<()> = SolverRegistry::new();
/// let mut planner = ExecutionPlanner::new();
/// // Planning before discovery is a caller error.
/// assert!(planner.execution_order(&registry).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlanner {
    cached: Option<Vec<String>>,
}

impl ExecutionPlanner {
    /// Creates a planner with an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self { cached: None }
    }

    /// Returns the execution order for the registry's current descriptor
    /// set, as a defensive copy of the memoized plan.
    ///
    /// The order is a permutation of all registered names: tiers appear in
    /// strictly ascending blocks, every dependency precedes its dependent,
    /// and ties are broken by name so identical descriptor sets always plan
    /// identically.
    ///
    /// # Errors
    ///
    /// - [`SolverError::NotDiscovered`] before the first discovery.
    /// - [`SolverError::UnresolvedDependencies`] listing every dependency
    ///   that names an unregistered solver.
    /// - [`SolverError::TierConflict`] listing every dependency edge that
    ///   points into a strictly later tier.
    /// - [`SolverError::CircularDependency`] carrying the full cycle chain.
    pub fn execution_order<M>(
        &mut self,
        registry: &SolverRegistry<M>,
    ) -> Result<Vec<String>, SolverError> {
        if let Some(order) = &self.cached {
            return Ok(order.clone());
        }
        let order = compute_order(registry)?;
        debug!(
            target: PLANNER_TARGET,
            count = order.len(),
            "execution order computed"
        );
        self.cached = Some(order.clone());
        Ok(order)
    }

    /// Drops the memoized plan; the next order request recomputes it.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

fn compute_order<M>(registry: &SolverRegistry<M>) -> Result<Vec<String>, SolverError> {
    let descriptors = registry.list()?;
    validate_resolvable(registry, &descriptors)?;
    validate_tiers(registry, &descriptors)?;

    // Registry listing is name-sorted, so each tier group seeds the
    // traversal in lexicographic order.
    let mut by_tier: BTreeMap<SolverPriority, Vec<String>> = BTreeMap::new();
    for descriptor in &descriptors {
        by_tier
            .entry(descriptor.priority())
            .or_default()
            .push(descriptor.name().to_owned());
    }

    let mut traversal = Traversal {
        registry,
        placed: HashSet::new(),
        stack: Vec::new(),
        order: Vec::with_capacity(descriptors.len()),
    };
    for names in by_tier.values() {
        for name in names {
            traversal.place(name)?;
        }
    }
    Ok(traversal.order)
}

/// Reports every dependency that names an unregistered solver, all at once.
fn validate_resolvable<M>(
    registry: &SolverRegistry<M>,
    descriptors: &[&SolverDescriptor<M>],
) -> Result<(), SolverError> {
    let mut missing = Vec::new();
    for descriptor in descriptors {
        for dependency in descriptor.depends_on() {
            if !registry.contains(dependency) {
                missing.push(MissingDependency {
                    solver: descriptor.name().to_owned(),
                    dependency: dependency.clone(),
                });
            }
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SolverError::UnresolvedDependencies { missing })
    }
}

/// Rejects dependency edges pointing into a strictly later tier.
///
/// Must run after [`validate_resolvable`] so every dependency is known to
/// resolve. Running it before traversal keeps tier monotonicity of the
/// produced order unconditional.
fn validate_tiers<M>(
    registry: &SolverRegistry<M>,
    descriptors: &[&SolverDescriptor<M>],
) -> Result<(), SolverError> {
    let mut conflicts = Vec::new();
    for descriptor in descriptors {
        for dependency in descriptor.depends_on() {
            let dependency_descriptor = registry.get(dependency)?;
            if dependency_descriptor.priority() > descriptor.priority() {
                conflicts.push(TierViolation {
                    solver: descriptor.name().to_owned(),
                    solver_tier: descriptor.priority(),
                    dependency: dependency.clone(),
                    dependency_tier: dependency_descriptor.priority(),
                });
            }
        }
    }
    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(SolverError::TierConflict { conflicts })
    }
}

/// Depth-first placement with an ordered in-progress stack for cycle
/// reporting.
struct Traversal<'a, M> {
    registry: &'a SolverRegistry<M>,
    placed: HashSet<String>,
    stack: Vec<String>,
    order: Vec<String>,
}

impl<M> Traversal<'_, M> {
    fn place(&mut self, name: &str) -> Result<(), SolverError> {
        if self.placed.contains(name) {
            return Ok(());
        }
        if let Some(position) = self.stack.iter().position(|entry| entry == name) {
            let mut cycle: Vec<String> = self.stack.iter().skip(position).cloned().collect();
            cycle.push(name.to_owned());
            return Err(SolverError::CircularDependency { cycle });
        }

        self.stack.push(name.to_owned());
        let descriptor = self.registry.get(name)?;
        for dependency in descriptor.depends_on() {
            self.place(dependency)?;
        }
        self.stack.pop();

        self.placed.insert(name.to_owned());
        self.order.push(name.to_owned());
        Ok(())
    }
}
