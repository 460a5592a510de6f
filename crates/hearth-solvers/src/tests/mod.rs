//! Crate-level integration and BDD tests.

use std::sync::Arc;

use crate::descriptor::SolverCandidate;
use crate::manager::{ErrorPolicy, SolverManager};
use crate::solver::{SolveError, Solver, SolverPriority};
use crate::source::StaticSource;


/// Model stand-in shared by the integration tests: a trace of executed
/// solver names.
type Trace = Vec<String>;

const GROUP: &str = "hearth.solvers";

struct RecordingSolver {
    name: String,
    priority: SolverPriority,
    depends_on: Vec<String>,
    fail: bool,
}

impl Solver<Trace> for RecordingSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        "1.0"
    }

    fn priority(&self) -> SolverPriority {
        self.priority
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    fn solve(&mut self, model: &mut Trace) -> Result<(), SolveError> {
        if self.fail {
            return Err(format!("{} rejected its inputs", self.name).into());
        }
        model.push(self.name.clone());
        Ok(())
    }
}

fn candidate(
    name: &str,
    priority: SolverPriority,
    deps: &[&str],
    fail: bool,
) -> SolverCandidate<Trace> {
    let solver_name = name.to_owned();
    let solver_deps: Vec<String> = deps.iter().map(|dep| (*dep).to_owned()).collect();
    SolverCandidate::new(format!("{name}-entry"))
        .with_name(name)
        .with_version("1.0")
        .with_priority(priority)
        .with_depends_on(solver_deps.clone())
        .with_factory(Arc::new(move || {
            Ok(Box::new(RecordingSolver {
                name: solver_name.clone(),
                priority,
                depends_on: solver_deps.clone(),
                fail,
            }))
        }))
}

/// Builds a discovered manager over the reference chain
/// foundation -> demand -> systems, with the named solvers broken.
fn reference_manager(broken: &[String]) -> SolverManager<Trace, StaticSource<Trace>> {
    let mut source = StaticSource::new();
    for (name, priority, deps) in [
        ("foundation", SolverPriority::Foundation, Vec::new()),
        ("demand", SolverPriority::Demand, vec!["foundation"]),
        ("systems", SolverPriority::Systems, vec!["demand"]),
    ] {
        let fail = broken.iter().any(|entry| entry == name);
        source.register(GROUP, candidate(name, priority, &deps, fail));
    }
    let mut manager = SolverManager::new(source);
    manager.discover(GROUP).expect("discovery succeeds");
    manager
}

#[test]
fn end_to_end_discover_plan_execute() {
    let mut manager = reference_manager(&[]);
    assert_eq!(
        manager.execution_order().expect("plan"),
        vec![
            "foundation".to_owned(),
            "demand".to_owned(),
            "systems".to_owned(),
        ]
    );

    let mut model = Trace::new();
    manager
        .execute_all(&mut model, ErrorPolicy::default())
        .expect("batch succeeds");
    assert_eq!(model, manager.history());

    let info = manager.solver_info("systems").expect("info");
    assert_eq!(info.priority(), SolverPriority::Systems);
    assert_eq!(info.depends_on(), ["demand".to_owned()]);
}
