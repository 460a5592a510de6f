//! Domain errors raised by solver discovery, planning, and execution.
//!
//! All errors use `thiserror`-derived enums with structured context so
//! callers can pinpoint the faulty solver or configuration without
//! re-running under a debugger. Causes raised by solver bodies and
//! factories are wrapped in `Arc` to satisfy the `result_large_err` Clippy
//! lint.

use std::sync::Arc;

use thiserror::Error;

use crate::solver::SolverPriority;


/// A plan-time reference to a dependency that is not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// Solver declaring the dependency.
    pub solver: String,
    /// Dependency name absent from the registry.
    pub dependency: String,
}

impl std::fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "solver '{}' depends on unknown solver '{}'",
            self.solver, self.dependency
        )
    }
}

/// A plan-time dependency edge pointing into a strictly later tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierViolation {
    /// Solver declaring the dependency.
    pub solver: String,
    /// Tier of the declaring solver.
    pub solver_tier: SolverPriority,
    /// The dependency living in a later tier.
    pub dependency: String,
    /// Tier of the dependency.
    pub dependency_tier: SolverPriority,
}

impl std::fmt::Display for TierViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "solver '{}' ({}) depends on '{}' in later tier {}",
            self.solver, self.solver_tier, self.dependency, self.dependency_tier
        )
    }
}

/// Errors arising from the solver engine.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A discovered candidate does not expose the full capability surface.
    #[error(
        "candidate '{source_key}' does not satisfy the solver capability \
         surface; missing members: {}",
        .missing.join(", ")
    )]
    ProtocolViolation {
        /// Identifier of the candidate within its discovery source.
        source_key: String,
        /// Names of the members the candidate failed to provide.
        missing: Vec<String>,
    },

    /// The discovery source itself failed to produce candidates.
    #[error("solver source failed for group '{group}': {message}")]
    Source {
        /// Group that was being scanned.
        group: String,
        /// Human-readable failure description.
        message: String,
    },

    /// A query was made before the first successful discovery.
    #[error("no solver discovery has been run; call discover() first")]
    NotDiscovered,

    /// Lookup by a name no registered solver carries.
    #[error("solver '{name}' not found (known solvers: {})", known_or_none(.known))]
    NotFound {
        /// Name that was looked up.
        name: String,
        /// Currently registered solver names, for diagnosis.
        known: Vec<String>,
    },

    /// One or more declared dependencies name unregistered solvers.
    #[error("unresolved solver dependencies: {}", join_displayed(.missing))]
    UnresolvedDependencies {
        /// Every offending (solver, missing-dependency) pair.
        missing: Vec<MissingDependency>,
    },

    /// One or more dependency edges point into a strictly later tier.
    #[error("dependency tier conflicts: {}", join_displayed(.conflicts))]
    TierConflict {
        /// Every offending edge with both tiers.
        conflicts: Vec<TierViolation>,
    },

    /// The dependency relation contains a cycle.
    #[error("circular solver dependency: {}", .cycle.join(" -> "))]
    CircularDependency {
        /// The chain of names from the first revisited solver back to
        /// itself.
        cycle: Vec<String>,
    },

    /// A solver's own dependency validator reported deficiencies.
    #[error("solver '{name}' has unsatisfied dependencies: {}", .problems.join("; "))]
    DependencyValidation {
        /// Solver that refused to run.
        name: String,
        /// Messages reported by the solver's validator.
        problems: Vec<String>,
    },

    /// A solver factory failed to produce an instance.
    #[error("failed to instantiate solver '{name}': {source}")]
    Instantiation {
        /// Solver whose factory failed.
        name: String,
        /// Underlying cause raised by the factory.
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A solver body failed during execution.
    #[error("solver '{name}' failed: {message}")]
    Execution {
        /// Solver that failed.
        name: String,
        /// Human-readable failure description.
        message: String,
        /// Underlying cause raised by the solver.
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A batch run attempted every solver and one or more failed.
    #[error("{} solver(s) failed: {}", .failures.len(), join_displayed(.failures))]
    Aggregate {
        /// The individual execution failures, in plan order.
        failures: Vec<SolverError>,
    },
}

impl SolverError {
    /// Returns the name of the solver this error concerns, if any.
    #[must_use]
    pub fn solver_name(&self) -> Option<&str> {
        match self {
            Self::NotFound { name, .. }
            | Self::DependencyValidation { name, .. }
            | Self::Instantiation { name, .. }
            | Self::Execution { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }
}

fn known_or_none(known: &[String]) -> String {
    if known.is_empty() {
        String::from("none")
    } else {
        known.join(", ")
    }
}

fn join_displayed<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
