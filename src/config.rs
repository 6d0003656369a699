//! Planner configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Where the external planner lives and how long it may run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Planner executable.
    pub solver_path: PathBuf,
    /// Domain definition handed to the planner next to each problem.
    pub domain_path: PathBuf,
    /// Name declared by the domain file.
    pub domain_name: String,
    /// Directory problem files are written to, one per plan.
    pub problems_dir: PathBuf,
    /// Wall-clock budget of each planner run, in seconds.
    pub timeout_secs: u64,
    /// Search budget passed on the cost-optimizing run. `None` skips that run.
    pub search_budget: Option<u32>,
    /// Divisor applied to visit durations of quicker plans.
    pub quicker_factor: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            solver_path: PathBuf::from("ff"),
            domain_path: PathBuf::from("domain/itinerary.pddl"),
            domain_name: "itinerary".to_string(),
            problems_dir: PathBuf::from("problems"),
            timeout_secs: 300,
            search_budget: Some(5),
            quicker_factor: 1.2,
        }
    }
}

impl PlannerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Problem file for a plan. Keyed by plan id so concurrent builds never share a file.
    pub fn problem_path(&self, plan_id: i64) -> PathBuf {
        self.problems_dir.join(format!("plan{}.pddl", plan_id))
    }
}
