//! Pluggable calculation engine for building-physics models.
//!
//! The `hearth-solvers` crate implements the scheduling core of Hearth:
//! independently developed calculation modules ("solvers") are discovered
//! from a pluggable [`source`], validated against an explicit capability
//! surface, ordered by priority tier and declared dependencies, and
//! executed strictly sequentially against a caller-owned model.
//!
//! # Architecture
//!
//! Discovery, planning, and execution are split across three collaborators
//! owned by one [`SolverManager`]:
//!
//! - the [`SolverRegistry`] scans a [`SolverSource`] for candidate records
//!   and promotes each into an immutable [`SolverDescriptor`];
//! - the [`ExecutionPlanner`] computes and memoizes a total order in which
//!   every priority tier fully precedes later tiers and every dependency
//!   precedes its dependent, rejecting cycles, unresolved names, and
//!   dependency edges that point into a later tier;
//! - the manager instantiates solvers through descriptor factories (one
//!   cached instance per name), drives them against the shared model, and
//!   records execution history, short-circuiting or aggregating failures
//!   per caller policy.
//!
//! The model type is an opaque generic parameter: the engine never inspects
//! it, and exclusive sequential access is the only synchronization.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hearth_solvers::{
//!     ErrorPolicy, SolveError, Solver, SolverCandidate, SolverManager, SolverPriority,
//!     StaticSource,
//! };
//!
//! struct ClimateLoads;
//!
//! impl Solver<Vec<String>> for ClimateLoads {
//!     fn name(&self) -> &str {
//!         "climate_loads"
//!     }
//!     fn version(&self) -> &str {
//!         "1.0"
//!     }
//!     fn priority(&self) -> SolverPriority {
//!         SolverPriority::Foundation
//!     }
//!     fn solve(&mut self, model: &mut Vec<String>) -> Result<(), SolveError> {
//!         model.push("climate_loads".into());
//!         Ok(())
//!     }
//! }
//!
//! let mut source = StaticSource::new();
//! source.register(
//!     "hearth.solvers",
//!     SolverCandidate::new("climate-loads-entry")
//!         .with_name("climate_loads")
//!         .with_version("1.0")
//!         .with_priority(SolverPriority::Foundation)
//!         .with_depends_on(Vec::new())
//!         .with_factory(Arc::new(|| Ok(Box::new(ClimateLoads)))),
//! );
//!
//! let mut manager = SolverManager::new(source);
//! manager.discover("hearth.solvers").expect("discovery succeeds");
//! assert_eq!(
//!     manager.execution_order().expect("plan"),
//!     vec!["climate_loads".to_owned()]
//! );
//!
//! let mut model = Vec::new();
//! manager
//!     .execute_all(&mut model, ErrorPolicy::default())
//!     .expect("execution succeeds");
//! assert_eq!(model, vec!["climate_loads".to_owned()]);
//! ```

pub mod descriptor;
pub mod error;
pub mod manager;
pub mod planner;
pub mod registry;
pub mod solver;
pub mod source;

#[cfg(test)]
mod tests;

pub use self::descriptor::{SolverCandidate, SolverDescriptor, SolverFactory, SolverInfo};
pub use self::error::{MissingDependency, SolverError, TierViolation};
pub use self::manager::{DependencyCheck, ErrorPolicy, SolverManager, SubsetOrder};
pub use self::planner::ExecutionPlanner;
pub use self::registry::SolverRegistry;
pub use self::solver::{SolveError, Solver, SolverPriority};
pub use self::source::{SolverSource, StaticSource};
