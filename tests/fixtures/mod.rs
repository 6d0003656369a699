//! Test fixtures for itinerary-planner.
//!
//! Provides realistic test data including:
//! - Real Madrid locations (from OpenStreetMap)
//! - A trip builder producing plan requests and jobs
//! - Scripted planner executables and trace text
#![allow(dead_code)]

pub mod madrid_locations;

pub use madrid_locations::*;

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use itinerary_planner::haversine::GeoEstimator;
use itinerary_planner::model::{Distance, Place};
use itinerary_planner::request::{PlanJob, PlanRequest};
use itinerary_planner::store::InMemoryDistanceStore;

// ============================================================================
// Trip builder
// ============================================================================

/// Builds plan requests with sensible defaults: one Monday in January,
/// 09:00 to 18:00, starting at Puerta del Sol.
#[derive(Debug, Clone)]
pub struct TripBuilder {
    plan_id: i64,
    owner: i64,
    places: Vec<Place>,
    start: Location,
    first_day: NaiveDate,
    days: u64,
    day_start: u32,
    day_end: u32,
    quicker: bool,
}

impl TripBuilder {
    pub fn new(plan_id: i64) -> Self {
        Self {
            plan_id,
            owner: 100 + plan_id,
            places: Vec::new(),
            start: sol().clone(),
            first_day: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            days: 1,
            day_start: 9 * 60,
            day_end: 18 * 60,
            quicker: false,
        }
    }

    /// Catalog place `id` at `location`.
    pub fn sight(mut self, id: i64, location: &Location, minutes: f64) -> Self {
        self.places.push(Place::catalog(id, location.coords(), minutes));
        self
    }

    pub fn place(mut self, place: Place) -> Self {
        self.places.push(place);
        self
    }

    pub fn starting_on(mut self, year: i32, month: u32, day: u32) -> Self {
        self.first_day = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        self
    }

    pub fn days(mut self, days: u64) -> Self {
        self.days = days;
        self
    }

    pub fn hours(mut self, day_start: u32, day_end: u32) -> Self {
        self.day_start = day_start;
        self.day_end = day_end;
        self
    }

    pub fn quicker(mut self) -> Self {
        self.quicker = true;
        self
    }

    pub fn request(&self) -> PlanRequest {
        PlanRequest {
            plan_id: self.plan_id,
            owner: self.owner,
            places: self.places.clone(),
            start_date: self.first_day,
            end_date: self.first_day + Days::new(self.days - 1),
            day_start: self.day_start,
            day_end: self.day_end,
            start: self.start.coords(),
            quicker: self.quicker,
        }
    }

    pub fn job(&self) -> PlanJob {
        self.request().into_job().expect("valid trip")
    }
}

/// Distance table for the catalog places of `job`, filled from geometric
/// estimates so tests never need a router.
pub fn distance_table(job: &PlanJob) -> InMemoryDistanceStore {
    let estimator = GeoEstimator::default();
    let catalog: Vec<(i64, _)> = job
        .places
        .iter()
        .filter_map(|place| Some((place.id.catalog_id()?, place.coordinates?)))
        .collect();

    let mut distances = Vec::new();
    for (i, (a, from)) in catalog.iter().enumerate() {
        for (b, to) in &catalog[i + 1..] {
            let travel = estimator.estimate(*from, *to);
            distances.push(Distance {
                place_a: *a,
                place_b: *b,
                meters: travel.meters,
                minutes: travel.minutes,
                mode: travel.mode,
            });
        }
    }
    InMemoryDistanceStore::with_distances(distances)
}

// ============================================================================
// Planner output
// ============================================================================

/// Planner stdout announcing a plan made of `steps`.
pub fn trace(steps: &[&str]) -> String {
    let mut out = String::from("ff: parsing domain file\nff: found legal plan as follows\n\nstep ");
    for (i, step) in steps.iter().enumerate() {
        out.push_str(&format!("{:>4}: {}\n", i, step.to_uppercase()));
    }
    out.push_str("\nplan cost: 1.000000\n\ntime spent:    0.01 seconds total\n");
    out
}

/// Planner stdout when the goal is unreachable.
pub const NO_PLAN: &str =
    "ff: parsing domain file\nff: goal can be simplified to FALSE. No plan will solve it\n";

/// Executable shell script standing in for the planner. Every run appends a
/// line to `calls.log` next to it, then runs `body`.
#[cfg(unix)]
pub fn solver_script(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("planner.sh");
    let log = dir.join("calls.log");
    let script = format!(
        "#!/bin/sh\necho \"$*\" >> '{}'\n{}\n",
        log.display(),
        body
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Script body printing `output` once the problem file passed with `-f` exists.
pub fn prints(output: &str) -> String {
    format!("test -f \"$4\" || exit 9\ncat <<'TRACE'\n{}TRACE", output)
}

/// Argument lines of every recorded planner run.
pub fn calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
