//! The solver capability surface and priority tiers.
//!
//! A solver is an independently developed calculation module that reads and
//! mutates a caller-owned building model. Every solver implements the
//! [`Solver`] trait — the explicit capability interface the registry
//! validates against and the manager executes through. Solvers declare a
//! coarse [`SolverPriority`] tier plus fine-grained name-level dependencies;
//! the planner combines both into a total execution order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::EnumString;


/// Error type produced by solver bodies and factories.
///
/// Solver implementations are external plugins; the engine treats their
/// failures as opaque and rewraps them into
/// [`SolverError`](crate::error::SolverError) variants carrying the solver
/// name.
pub type SolveError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Execution priority tier for solver ordering.
///
/// Tiers are processed strictly ascending: every solver in a lower tier is
/// placed before any solver in a higher tier. Within a tier, solvers are
/// ordered by their declared dependencies. A dependency on a solver in a
/// *later* tier is a configuration error reported at plan time, never a
/// reordering hint.
///
/// # Example
///
/// ```
/// use hearth_solvers::solver::SolverPriority;
///
/// assert!(SolverPriority::Foundation < SolverPriority::Demand);
/// assert_eq!(SolverPriority::Systems.as_str(), "systems");
/// assert_eq!("ANALYSIS".parse::<SolverPriority>(), Ok(SolverPriority::Analysis));
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SolverPriority {
    /// Ground, climate, and geometry solvers with no upstream inputs.
    Foundation,
    /// Heating and cooling demand solvers.
    Demand,
    /// HVAC and hot-water system solvers.
    Systems,
    /// Site-energy and carbon aggregation solvers.
    Aggregation,
    /// Compliance and reporting solvers.
    Analysis,
}

impl SolverPriority {
    /// All tiers in ascending execution order.
    pub const ALL: [Self; 5] = [
        Self::Foundation,
        Self::Demand,
        Self::Systems,
        Self::Aggregation,
        Self::Analysis,
    ];

    /// Returns the canonical snake_case string for this tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Foundation => "foundation",
            Self::Demand => "demand",
            Self::Systems => "systems",
            Self::Aggregation => "aggregation",
            Self::Analysis => "analysis",
        }
    }
}

impl std::fmt::Display for SolverPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability interface every solver plugin must implement.
///
/// The type parameter `M` is the caller-owned model the engine schedules
/// calculations against. The engine never inspects the model; it is handed
/// to each solver by mutable reference, relying on strictly sequential
/// execution for exclusive access.
///
/// Metadata methods ([`name`](Solver::name), [`version`](Solver::version),
/// [`priority`](Solver::priority), [`depends_on`](Solver::depends_on)) must
/// agree with the candidate record the solver was discovered from; the
/// registry keys descriptors by the declared name.
///
/// # Example
///
/// ```
/// use hearth_solvers::solver::{SolveError, Solver, SolverPriority};
///
/// /// Model stand-in: a trace of executed solver names.
/// struct ClimateLoads;
///
/// impl Solver<Vec<String>> for ClimateLoads {
///     fn name(&self) -> &str {
///         "climate_loads"
///     }
///
///     fn version(&self) -> &str {
///         "1.0.0"
///     }
///
///     fn priority(&self) -> SolverPriority {
///         SolverPriority::Foundation
///     }
///
///     fn solve(&mut self, model: &mut Vec<String>) -> Result<(), SolveError> {
///         model.push("climate_loads".into());
///         Ok(())
///     }
/// }
/// ```
pub trait Solver<M> {
    /// Unique identifier for this solver (e.g. `"cooling_demand"`).
    fn name(&self) -> &str;

    /// Version of the solver algorithm (e.g. `"PHPP-10.4"`). Informational.
    fn version(&self) -> &str;

    /// Execution priority tier.
    fn priority(&self) -> SolverPriority;

    /// Names of solvers that must execute before this one.
    ///
    /// Dependencies may live in the same or an earlier tier only.
    fn depends_on(&self) -> &[String] {
        &[]
    }

    /// Human-readable description of what this solver calculates.
    fn description(&self) -> &str {
        ""
    }

    /// Runs the calculation against the shared model.
    ///
    /// The manager guarantees all declared dependencies have executed when a
    /// solver is invoked through a planned batch. Repeated invocation is
    /// permitted; idempotence is the solver's own responsibility.
    ///
    /// # Errors
    ///
    /// Returns any failure of the calculation; the manager rewraps it as
    /// [`SolverError::Execution`](crate::error::SolverError::Execution).
    fn solve(&mut self, model: &mut M) -> Result<(), SolveError>;

    /// Checks this solver's dependencies against the set of known names.
    ///
    /// Called by the manager before a single-solver execution. The check is
    /// against registration, not against execution history. Returns one
    /// message per deficiency; an empty list means the solver may run.
    fn validate_dependencies(&self, available: &BTreeSet<String>) -> Vec<String> {
        self.depends_on()
            .iter()
            .filter(|dep| !available.contains(*dep))
            .map(|dep| format!("missing required dependency '{dep}'"))
            .collect()
    }
}
