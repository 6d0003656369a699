//! End-to-end plan builds against scripted planner executables.
//!
//! Each test writes a small shell script that stands in for the planner,
//! so the real process handling (arguments, deadlines, kill) is exercised.
#![cfg(unix)]

mod fixtures;

use std::sync::Arc;

use tempfile::TempDir;

use itinerary_planner::calendar::format_clock;
use itinerary_planner::config::PlannerConfig;
use itinerary_planner::distance::DistanceResolver;
use itinerary_planner::haversine::GeoEstimator;
use itinerary_planner::model::{ItemKind, ItineraryItem, OpeningWindow, Place};
use itinerary_planner::pipeline::Planner;
use itinerary_planner::request::PlanJob;
use itinerary_planner::solver::ExternalSolver;
use itinerary_planner::status::PlanStatus;
use itinerary_planner::store::{InMemoryPlanStore, StoreError};
use itinerary_planner::traits::PlanStore;

use fixtures::{
    NO_PLAN, SIGHTS, TripBuilder, calls, distance_table, prints, sol, solver_script, trace,
};

// ============================================================================
// Test Infrastructure
// ============================================================================

struct Harness {
    dir: TempDir,
    planner: Arc<Planner>,
}

impl Harness {
    fn new(job: &PlanJob, body: &str, timeout_secs: u64, store: Arc<dyn PlanStore>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = PlannerConfig {
            solver_path: solver_script(dir.path(), body),
            domain_path: dir.path().join("domain.pddl"),
            problems_dir: dir.path().join("problems"),
            timeout_secs,
            ..PlannerConfig::default()
        };
        store.create_plan(job.plan_id, job.owner).unwrap();

        let cost = Arc::new(DistanceResolver::new(distance_table(job)));
        let solver = Arc::new(ExternalSolver::from_config(&config));
        let planner = Arc::new(Planner::new(config, cost, store, solver));
        Self { dir, planner }
    }

    fn calls(&self) -> Vec<String> {
        calls(self.dir.path())
    }

    fn artifact_removed(&self, plan_id: i64) -> bool {
        !self.planner.config().problem_path(plan_id).exists()
    }

    fn status(&self, plan_id: i64) -> Option<PlanStatus> {
        self.planner.store().status(plan_id).unwrap()
    }

    fn items(&self, plan_id: i64) -> Vec<ItineraryItem> {
        self.planner.store().items(plan_id).unwrap()
    }
}

fn two_sights(plan_id: i64) -> PlanJob {
    TripBuilder::new(plan_id)
        .sight(1, &SIGHTS[0], 60.0)
        .sight(2, &SIGHTS[1], 45.0)
        .job()
}

fn walking(from: &fixtures::Location, to: &fixtures::Location) -> f64 {
    GeoEstimator::default().estimate(from.coords(), to.coords()).minutes
}

const ONE_DAY: &[&str] = &[
    "start-day place1 jan062025",
    "visit place1 jan062025",
    "move place1 place2 jan062025",
    "visit place2 jan062025",
    "end-day place2 jan062025",
];

// ============================================================================
// Successful builds
// ============================================================================

#[tokio::test]
async fn single_day_two_places() {
    let job = two_sights(1);
    let h = Harness::new(&job, &prints(&trace(ONE_DAY)), 5, Arc::new(InMemoryPlanStore::new()));

    let status = h.planner.build(job.clone()).await;

    assert_eq!(status, PlanStatus::Ok);
    assert_eq!(h.status(1), Some(PlanStatus::Ok));
    assert_eq!(h.calls().len(), 1);
    assert!(h.calls()[0].ends_with("-s 5"));
    assert!(h.artifact_removed(1));

    let items = h.items(1);
    let kinds: Vec<ItemKind> = items.iter().map(|item| item.kind).collect();
    assert_eq!(kinds, vec![ItemKind::Start, ItemKind::Place, ItemKind::Place]);
    assert!(items.iter().all(|item| item.day == 0 && item.plan_id == 1));
    assert_eq!(items.iter().map(|i| i.order).collect::<Vec<_>>(), vec![0, 1, 2]);

    let to_prado = walking(sol(), &SIGHTS[0]);
    let prado_to_reina = walking(&SIGHTS[0], &SIGHTS[1]);
    assert_eq!(items[0].start_time, "09:00");
    assert_eq!(items[0].travel_next, to_prado.ceil() as i32);

    assert_eq!(items[1].place_id, Some(1));
    assert_eq!(items[1].start_time, format_clock(540.0 + to_prado));
    assert_eq!(items[1].end_time, format_clock(540.0 + to_prado + 60.0));
    assert_eq!(items[1].travel_next, prado_to_reina.ceil() as i32);

    assert_eq!(items[2].place_id, Some(2));
    assert_eq!(
        items[2].start_time,
        format_clock(540.0 + to_prado + 60.0 + prado_to_reina)
    );
    assert_eq!(items[2].travel_next, -1);
}

#[tokio::test]
async fn leading_wait_keeps_start_first() {
    let job = TripBuilder::new(2).sight(1, &SIGHTS[0], 60.0).job();
    let steps = [
        "start-wait start",
        "wait start",
        "wait start",
        "wait start",
        "end-wait start",
        "start-day place1 jan062025",
        "visit place1 jan062025",
        "end-day place1 jan062025",
    ];
    let h = Harness::new(&job, &prints(&trace(&steps)), 5, Arc::new(InMemoryPlanStore::new()));

    assert_eq!(h.planner.build(job).await, PlanStatus::Ok);

    let items = h.items(2);
    let kinds: Vec<ItemKind> = items.iter().map(|item| item.kind).collect();
    assert_eq!(kinds, vec![ItemKind::Start, ItemKind::Wait, ItemKind::Place]);
    assert_eq!(items.iter().map(|i| i.order).collect::<Vec<_>>(), vec![0, 1, 2]);

    let (start, wait) = (&items[0], &items[1]);
    assert_eq!(start.start_time, "09:00");
    assert_eq!(start.start_time, wait.start_time);
    assert_eq!(wait.end_time, "09:30");
    assert_eq!(wait.time_spent, 30.0);
    assert_eq!(wait.travel_next, walking(sol(), &SIGHTS[0]).ceil() as i32);
    assert_eq!(items[2].travel_next, -1);
}

#[tokio::test]
async fn wait_fills_gap_before_opening() {
    // Reina Sofía opens at 11:00 on Mondays, after the walk over from the Prado.
    let opens_at = 11 * 60;
    let monday = OpeningWindow::every_month(1, "11:00", "18:00").unwrap();
    let job = TripBuilder::new(10)
        .sight(1, &SIGHTS[0], 60.0)
        .place(Place::catalog(2, SIGHTS[1].coords(), 45.0).with_window(monday))
        .job();

    let arrival = 540.0 + walking(sol(), &SIGHTS[0]) + 60.0 + walking(&SIGHTS[0], &SIGHTS[1]);
    assert!(arrival < f64::from(opens_at));
    let gap_ticks = ((f64::from(opens_at) - arrival) / 15.0).ceil() as usize;
    let waited = 15.0 * gap_ticks as f64;

    // One tick opens the wait, each further tick is 15 minutes.
    let mut steps = vec![
        "start-day place1 jan062025",
        "visit place1 jan062025",
        "move place1 place2 jan062025",
        "start-wait place2",
    ];
    steps.extend(std::iter::repeat_n("wait place2", gap_ticks + 1));
    steps.extend(["end-wait place2", "visit place2 jan062025", "end-day place2 jan062025"]);

    let body = format!(
        "cp \"$4\" \"$(dirname \"$0\")/seen.pddl\"\n{}",
        prints(&trace(&steps))
    );
    let h = Harness::new(&job, &body, 5, Arc::new(InMemoryPlanStore::new()));

    assert_eq!(h.planner.build(job).await, PlanStatus::Ok);

    let problem = std::fs::read_to_string(h.dir.path().join("seen.pddl")).unwrap();
    assert!(problem.contains(&format!("    (= (opens place2 jan062025) {})\n", opens_at)));
    assert!(problem.contains("    (= (opens place1 jan062025) 0)\n"));

    let items = h.items(10);
    let kinds: Vec<ItemKind> = items.iter().map(|item| item.kind).collect();
    assert_eq!(
        kinds,
        vec![ItemKind::Start, ItemKind::Place, ItemKind::Wait, ItemKind::Place]
    );
    assert_eq!(items.iter().map(|i| i.order).collect::<Vec<_>>(), vec![0, 1, 2, 3]);

    let (wait, reina) = (&items[2], &items[3]);
    assert_eq!(wait.time_spent, waited);
    assert_eq!(wait.start_time, format_clock(arrival));
    assert_eq!(wait.end_time, format_clock(arrival + waited));
    assert_eq!(reina.place_id, Some(2));
    assert_eq!(reina.start_time, wait.end_time);
    assert!(reina.start_time.as_str() >= "11:00");
    assert!(arrival + waited - 15.0 < f64::from(opens_at));
}

#[tokio::test]
async fn relaxed_run_answers_after_optimizing_run_times_out() {
    let job = two_sights(3);
    let body = format!(
        "case \"$*\" in *\" -s \"*) exec sleep 30;; esac\n{}",
        prints(&trace(ONE_DAY))
    );
    let h = Harness::new(&job, &body, 1, Arc::new(InMemoryPlanStore::new()));

    assert_eq!(h.planner.build(job).await, PlanStatus::Ok);

    let calls = h.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].contains("-s 5"));
    assert!(!calls[1].contains("-s"));
    assert_eq!(h.items(3).len(), 3);
}

// ============================================================================
// Terminal failures
// ============================================================================

#[tokio::test]
async fn both_runs_time_out() {
    let job = two_sights(4);
    let h = Harness::new(&job, "exec sleep 30", 1, Arc::new(InMemoryPlanStore::new()));

    let began = std::time::Instant::now();
    assert_eq!(h.planner.build(job).await, PlanStatus::TimedOut);
    assert!(began.elapsed() < std::time::Duration::from_secs(20));

    assert_eq!(h.status(4), Some(PlanStatus::TimedOut));
    assert_eq!(h.calls().len(), 2);
    assert!(h.items(4).is_empty());
    assert!(h.artifact_removed(4));
}

#[tokio::test]
async fn unsolvable_plan() {
    let job = two_sights(5);
    let h = Harness::new(&job, &prints(NO_PLAN), 5, Arc::new(InMemoryPlanStore::new()));

    assert_eq!(h.planner.build(job).await, PlanStatus::NoSolution);
    assert_eq!(h.status(5), Some(PlanStatus::NoSolution));
    assert!(h.items(5).is_empty());
    assert_eq!(h.calls().len(), 1);
    assert!(h.artifact_removed(5));
}

#[tokio::test]
async fn malformed_trace_is_internal_error() {
    let job = two_sights(6);
    let h = Harness::new(
        &job,
        &prints(&trace(&["teleport place1 jan062025"])),
        5,
        Arc::new(InMemoryPlanStore::new()),
    );

    assert_eq!(h.planner.build(job).await, PlanStatus::InternalError);
    assert!(h.items(6).is_empty());
    assert!(h.artifact_removed(6));
}

#[tokio::test]
async fn crashing_planner_is_not_retried() {
    let job = two_sights(7);
    let h = Harness::new(
        &job,
        "echo 'syntax error in problem' >&2\nexit 1",
        5,
        Arc::new(InMemoryPlanStore::new()),
    );

    assert_eq!(h.planner.build(job).await, PlanStatus::InternalError);
    assert_eq!(h.calls().len(), 1);
    assert!(h.artifact_removed(7));
}

/// Plan store whose item table refuses writes.
struct ReadOnlyItems(InMemoryPlanStore);

impl PlanStore for ReadOnlyItems {
    fn create_plan(&self, plan_id: i64, owner: i64) -> Result<(), StoreError> {
        self.0.create_plan(plan_id, owner)
    }

    fn status(&self, plan_id: i64) -> Result<Option<PlanStatus>, StoreError> {
        self.0.status(plan_id)
    }

    fn set_status(&self, plan_id: i64, status: PlanStatus) -> Result<(), StoreError> {
        self.0.set_status(plan_id, status)
    }

    fn insert_items(&self, _plan_id: i64, _items: &[ItineraryItem]) -> Result<(), StoreError> {
        Err(StoreError::Internal("itinerary table is read-only".into()))
    }

    fn items(&self, plan_id: i64) -> Result<Vec<ItineraryItem>, StoreError> {
        self.0.items(plan_id)
    }
}

#[tokio::test]
async fn persistence_failure_is_internal_error() {
    let job = two_sights(8);
    let h = Harness::new(
        &job,
        &prints(&trace(ONE_DAY)),
        5,
        Arc::new(ReadOnlyItems(InMemoryPlanStore::new())),
    );

    assert_eq!(h.planner.build(job).await, PlanStatus::InternalError);
    assert_eq!(h.status(8), Some(PlanStatus::InternalError));
    assert!(h.items(8).is_empty());
}

#[tokio::test]
async fn unknown_catalog_distance_fails_before_solving() {
    let mut job = two_sights(9);
    // Place 3 has no row in the distance table.
    job.places.push(Place::catalog(3, SIGHTS[2].coords(), 30.0));
    let dir = tempfile::tempdir().unwrap();
    let config = PlannerConfig {
        solver_path: solver_script(dir.path(), &prints(&trace(ONE_DAY))),
        problems_dir: dir.path().join("problems"),
        ..PlannerConfig::default()
    };
    let store = Arc::new(InMemoryPlanStore::new());
    store.create_plan(9, job.owner).unwrap();
    let cost = Arc::new(DistanceResolver::new(distance_table(&two_sights(9))));
    let solver = Arc::new(ExternalSolver::from_config(&config));
    let planner = Planner::new(config, cost, store.clone(), solver);

    assert_eq!(planner.build(job).await, PlanStatus::InternalError);
    assert!(calls(dir.path()).is_empty());
}
