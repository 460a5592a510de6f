//! Unit tests for the solver manager.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mockall::mock;
use rstest::{fixture, rstest};

use super::*;
use crate::descriptor::SolverCandidate;
use crate::solver::{SolveError, SolverPriority};

type Model = Vec<String>;

const GROUP: &str = "hearth.solvers";

mock! {
    Source {}

    impl crate::source::SolverSource<Vec<String>> for Source {
        fn candidates(&self, group: &str) -> Result<Vec<SolverCandidate<Vec<String>>>, SolverError>;
    }
}

struct StubSolver {
    name: String,
    depends_on: Vec<String>,
    fail: bool,
}

impl Solver<Model> for StubSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        "1.0"
    }

    fn priority(&self) -> SolverPriority {
        SolverPriority::Foundation
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    fn solve(&mut self, model: &mut Model) -> Result<(), SolveError> {
        if self.fail {
            return Err(format!("{} rejected its inputs", self.name).into());
        }
        model.push(self.name.clone());
        Ok(())
    }
}

struct SolverSeed {
    name: &'static str,
    priority: SolverPriority,
    deps: &'static [&'static str],
    fail: bool,
}

fn candidate(seed: &SolverSeed, instantiations: &Arc<AtomicUsize>) -> SolverCandidate<Model> {
    let name = seed.name.to_owned();
    let deps: Vec<String> = seed.deps.iter().map(|dep| (*dep).to_owned()).collect();
    let fail = seed.fail;
    let counter = Arc::clone(instantiations);
    SolverCandidate::new(format!("{}-entry", seed.name))
        .with_name(seed.name)
        .with_version("1.0")
        .with_priority(seed.priority)
        .with_depends_on(deps.clone())
        .with_factory(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubSolver {
                name: name.clone(),
                depends_on: deps.clone(),
                fail,
            }))
        }))
}

/// Reference chain: foundation -> demand -> systems, with a per-run
/// instantiation counter shared by all factories.
fn reference_manager(
    broken: &[&str],
) -> (
    SolverManager<Model, crate::source::StaticSource<Model>>,
    Arc<AtomicUsize>,
) {
    let instantiations = Arc::new(AtomicUsize::new(0));
    let mut source = crate::source::StaticSource::new();
    for seed in [
        SolverSeed {
            name: "foundation",
            priority: SolverPriority::Foundation,
            deps: &[],
            fail: false,
        },
        SolverSeed {
            name: "demand",
            priority: SolverPriority::Demand,
            deps: &["foundation"],
            fail: false,
        },
        SolverSeed {
            name: "systems",
            priority: SolverPriority::Systems,
            deps: &["demand"],
            fail: false,
        },
    ] {
        let toggled = SolverSeed {
            fail: broken.contains(&seed.name),
            ..seed
        };
        source.register(GROUP, candidate(&toggled, &instantiations));
    }
    let mut manager = SolverManager::new(source);
    manager.discover(GROUP).expect("discovery succeeds");
    (manager, instantiations)
}

#[fixture]
fn healthy() -> (
    SolverManager<Model, crate::source::StaticSource<Model>>,
    Arc<AtomicUsize>,
) {
    reference_manager(&[])
}

// ---------------------------------------------------------------------------
// Instance cache
// ---------------------------------------------------------------------------

#[rstest]
fn instance_is_cached_and_pointer_stable(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, instantiations) = healthy;
    let first = std::ptr::from_mut(manager.instance("demand").expect("first instance")).cast::<()>();
    let second =
        std::ptr::from_mut(manager.instance("demand").expect("second instance")).cast::<()>();
    assert_eq!(first, second, "repeated lookups must return the same object");
    assert_eq!(instantiations.load(Ordering::SeqCst), 1);
}

#[rstest]
fn instance_unknown_name_fails(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, _) = healthy;
    assert!(matches!(
        manager.instance("ground"),
        Err(SolverError::NotFound { .. })
    ));
}

#[test]
fn factory_failure_is_wrapped_and_not_cached() {
    let mut source = crate::source::StaticSource::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    source.register(
        GROUP,
        SolverCandidate::<Model>::new("cursed-entry")
            .with_name("cursed")
            .with_version("1.0")
            .with_priority(SolverPriority::Foundation)
            .with_depends_on(Vec::new())
            .with_factory(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("no such coefficient table".into())
            })),
    );
    let mut manager = SolverManager::new(source);
    manager.discover(GROUP).expect("discovery succeeds");

    let err = manager.instance("cursed").err().expect("factory must fail");
    assert!(
        matches!(err, SolverError::Instantiation { ref name, .. } if name == "cursed"),
        "expected Instantiation for 'cursed', got: {err}"
    );
    assert!(err.to_string().contains("no such coefficient table"));

    // A failed factory leaves nothing cached; the next lookup retries.
    let _ = manager.instance("cursed").err().expect("still failing");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

// ---------------------------------------------------------------------------
// Single execution
// ---------------------------------------------------------------------------

#[rstest]
fn execute_one_success_mutates_model_and_records_history(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, _) = healthy;
    let mut model = Model::new();
    manager
        .execute_one("foundation", &mut model, DependencyCheck::default())
        .expect("execution succeeds");
    assert_eq!(model, vec!["foundation".to_owned()]);
    assert_eq!(manager.history(), vec!["foundation".to_owned()]);
}

#[test]
fn execute_one_validates_against_known_names_not_history() {
    let instantiations = Arc::new(AtomicUsize::new(0));
    let mut source = crate::source::StaticSource::new();
    // "demand" depends on a solver that was never registered.
    source.register(
        GROUP,
        candidate(
            &SolverSeed {
                name: "demand",
                priority: SolverPriority::Demand,
                deps: &["phantom"],
                fail: false,
            },
            &instantiations,
        ),
    );
    let mut manager = SolverManager::new(source);
    manager.discover(GROUP).expect("discovery succeeds");

    let mut model = Model::new();
    let err = manager
        .execute_one("demand", &mut model, DependencyCheck::Validate)
        .expect_err("validation must fail");
    let SolverError::DependencyValidation { name, problems } = err else {
        panic!("expected DependencyValidation");
    };
    assert_eq!(name, "demand");
    assert!(
        problems.iter().any(|p| p.contains("phantom")),
        "expected 'phantom' in problems: {problems:?}"
    );
    assert!(model.is_empty());
    assert!(manager.history().is_empty());

    // Skipping validation lets the solver run; registration is the only
    // gate, execution history is not consulted.
    manager
        .execute_one("demand", &mut model, DependencyCheck::Skip)
        .expect("skip bypasses validation");
    assert_eq!(model, vec!["demand".to_owned()]);
}

#[test]
fn execute_one_failure_is_wrapped_and_left_out_of_history() {
    let (mut manager, instantiations) = reference_manager(&["demand"]);
    let mut model = Model::new();
    let err = manager
        .execute_one("demand", &mut model, DependencyCheck::default())
        .expect_err("solver must fail");
    let SolverError::Execution { name, message, .. } = err else {
        panic!("expected Execution");
    };
    assert_eq!(name, "demand");
    assert!(message.contains("rejected its inputs"));
    assert!(manager.history().is_empty());

    // The failed instance stays cached; repeated execution re-uses it.
    let _ = manager
        .execute_one("demand", &mut model, DependencyCheck::default())
        .expect_err("still failing");
    assert_eq!(instantiations.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Batch execution
// ---------------------------------------------------------------------------

#[rstest]
fn execute_all_runs_the_full_plan_in_order(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, _) = healthy;
    let mut model = Model::new();
    manager
        .execute_all(&mut model, ErrorPolicy::default())
        .expect("batch succeeds");
    let expected = vec![
        "foundation".to_owned(),
        "demand".to_owned(),
        "systems".to_owned(),
    ];
    assert_eq!(model, expected);
    assert_eq!(manager.history(), expected);
}

#[test]
fn execute_all_fail_fast_stops_at_the_failure() {
    let (mut manager, _) = reference_manager(&["demand"]);
    let mut model = Model::new();
    let err = manager
        .execute_all(&mut model, ErrorPolicy::FailFast)
        .expect_err("batch must fail");
    assert!(
        matches!(err, SolverError::Execution { ref name, .. } if name == "demand"),
        "expected Execution for 'demand', got: {err}"
    );
    assert_eq!(manager.history(), vec!["foundation".to_owned()]);
    assert_eq!(model, vec!["foundation".to_owned()]);
}

#[test]
fn execute_all_aggregate_attempts_every_solver() {
    let (mut manager, _) = reference_manager(&["demand"]);
    let mut model = Model::new();
    let err = manager
        .execute_all(&mut model, ErrorPolicy::Aggregate)
        .expect_err("batch must fail");
    let SolverError::Aggregate { failures } = err else {
        panic!("expected Aggregate");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures.first().and_then(SolverError::solver_name),
        Some("demand")
    );
    assert_eq!(
        manager.history(),
        vec!["foundation".to_owned(), "systems".to_owned()]
    );
    assert_eq!(
        model,
        vec!["foundation".to_owned(), "systems".to_owned()]
    );
}

// ---------------------------------------------------------------------------
// Subset execution
// ---------------------------------------------------------------------------

#[rstest]
fn execute_subset_planned_reorders_to_the_plan(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, _) = healthy;
    let mut model = Model::new();
    manager
        .execute_subset(
            &["systems", "foundation", "demand"],
            &mut model,
            SubsetOrder::Planned,
            ErrorPolicy::default(),
        )
        .expect("subset succeeds");
    assert_eq!(
        manager.history(),
        vec![
            "foundation".to_owned(),
            "demand".to_owned(),
            "systems".to_owned(),
        ]
    );
}

#[rstest]
fn execute_subset_planned_filters_to_requested_names(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, _) = healthy;
    let mut model = Model::new();
    manager
        .execute_subset(
            &["systems", "foundation"],
            &mut model,
            SubsetOrder::Planned,
            ErrorPolicy::default(),
        )
        .expect("subset succeeds");
    assert_eq!(
        manager.history(),
        vec!["foundation".to_owned(), "systems".to_owned()]
    );
}

#[rstest]
fn execute_subset_requested_honours_caller_order(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, _) = healthy;
    let mut model = Model::new();
    manager
        .execute_subset(
            &["systems", "foundation"],
            &mut model,
            SubsetOrder::Requested,
            ErrorPolicy::default(),
        )
        .expect("subset succeeds");
    assert_eq!(
        manager.history(),
        vec!["systems".to_owned(), "foundation".to_owned()]
    );
}

#[rstest]
fn execute_subset_unknown_name_fails_before_anything_runs(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, _) = healthy;
    let mut model = Model::new();
    let err = manager
        .execute_subset(
            &["foundation", "phantom"],
            &mut model,
            SubsetOrder::Planned,
            ErrorPolicy::default(),
        )
        .expect_err("unknown name must fail");
    let SolverError::NotFound { name, known } = err else {
        panic!("expected NotFound");
    };
    assert_eq!(name, "phantom");
    assert_eq!(
        known,
        vec![
            "demand".to_owned(),
            "foundation".to_owned(),
            "systems".to_owned(),
        ]
    );
    assert!(model.is_empty());
    assert!(manager.history().is_empty());
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[rstest]
fn reset_clears_instances_and_history_but_keeps_the_plan(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, instantiations) = healthy;
    let mut model = Model::new();
    manager
        .execute_all(&mut model, ErrorPolicy::default())
        .expect("first batch");
    assert_eq!(instantiations.load(Ordering::SeqCst), 3);

    manager.reset();
    assert!(manager.history().is_empty());
    assert_eq!(
        manager.available_solvers().expect("registry survives reset").len(),
        3
    );

    let mut second_model = Model::new();
    manager
        .execute_all(&mut second_model, ErrorPolicy::default())
        .expect("second batch");
    assert_eq!(manager.history().len(), 3);
    assert_eq!(
        instantiations.load(Ordering::SeqCst),
        6,
        "reset must force re-instantiation"
    );
}

#[rstest]
fn discover_clears_instances_and_history(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, _) = healthy;
    let mut model = Model::new();
    manager
        .execute_all(&mut model, ErrorPolicy::default())
        .expect("batch succeeds");
    assert_eq!(manager.history().len(), 3);

    manager.discover(GROUP).expect("re-discovery succeeds");
    assert!(manager.history().is_empty());
}

#[rstest]
fn clear_history_leaves_instances_cached(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, instantiations) = healthy;
    let mut model = Model::new();
    manager
        .execute_all(&mut model, ErrorPolicy::default())
        .expect("batch succeeds");

    manager.clear_history();
    assert!(manager.history().is_empty());

    let mut second_model = Model::new();
    manager
        .execute_all(&mut second_model, ErrorPolicy::default())
        .expect("second batch");
    assert_eq!(
        instantiations.load(Ordering::SeqCst),
        3,
        "clearing history must not evict instances"
    );
}

#[rstest]
fn history_is_a_defensive_copy(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, _) = healthy;
    let mut model = Model::new();
    manager
        .execute_one("foundation", &mut model, DependencyCheck::default())
        .expect("execution succeeds");
    let mut copy = manager.history();
    copy.push("tampered".to_owned());
    assert_eq!(manager.history(), vec!["foundation".to_owned()]);
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[rstest]
fn queries_surface_registry_metadata(
    healthy: (
        SolverManager<Model, crate::source::StaticSource<Model>>,
        Arc<AtomicUsize>,
    ),
) {
    let (mut manager, _) = healthy;
    assert_eq!(
        manager.available_solvers().expect("available"),
        vec![
            "demand".to_owned(),
            "foundation".to_owned(),
            "systems".to_owned(),
        ]
    );
    let info = manager.solver_info("demand").expect("info");
    assert_eq!(info.priority(), SolverPriority::Demand);
    assert_eq!(info.depends_on(), ["foundation".to_owned()]);
    assert_eq!(
        manager.execution_order().expect("order"),
        vec![
            "foundation".to_owned(),
            "demand".to_owned(),
            "systems".to_owned(),
        ]
    );
}

#[test]
fn queries_before_discovery_fail() {
    let mut manager: SolverManager<Model, crate::source::StaticSource<Model>> =
        SolverManager::new(crate::source::StaticSource::new());
    let mut model = Model::new();
    assert!(matches!(
        manager.execution_order(),
        Err(SolverError::NotDiscovered)
    ));
    assert!(matches!(
        manager.execute_all(&mut model, ErrorPolicy::default()),
        Err(SolverError::NotDiscovered)
    ));
    assert!(matches!(
        manager.execute_subset(
            &["foundation"],
            &mut model,
            SubsetOrder::default(),
            ErrorPolicy::default()
        ),
        Err(SolverError::NotDiscovered)
    ));
}

// ---------------------------------------------------------------------------
// Source interaction
// ---------------------------------------------------------------------------

#[test]
fn discover_propagates_source_failure() {
    let mut mock_source = MockSource::new();
    mock_source
        .expect_candidates()
        .withf(|group| group == GROUP)
        .times(1)
        .returning(|group| {
            Err(SolverError::Source {
                group: group.to_owned(),
                message: "registry file unreadable".into(),
            })
        });

    let mut manager = SolverManager::new(mock_source);
    let err = manager.discover(GROUP).expect_err("discovery must fail");
    assert!(
        matches!(err, SolverError::Source { ref message, .. }
            if message == "registry file unreadable"),
        "expected Source error, got: {err}"
    );
    assert!(!manager.registry().is_discovered());
}

#[test]
fn discover_passes_the_group_through_to_the_source() {
    let mut mock_source = MockSource::new();
    mock_source
        .expect_candidates()
        .withf(|group| group == "hearth.custom")
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let mut manager = SolverManager::new(mock_source);
    manager
        .discover("hearth.custom")
        .expect("discovery succeeds");
    assert!(manager.registry().is_discovered());
}
