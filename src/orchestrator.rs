//! Problem artifact handling and the two-attempt solver fallback.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::problem::ProblemDescription;
use crate::solver::{SearchStrategy, SolverError};
use crate::traits::Solver;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("cannot write problem file {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("planner timed out on every attempt")]
    TimedOut,
    #[error("planner failed on the {strategy:?} attempt: {source}")]
    Process {
        strategy: SearchStrategy,
        #[source]
        source: SolverError,
    },
}

/// Drives one plan through the solver: a cost-optimizing attempt first,
/// then a relaxed one if the first runs out of time.
pub struct Orchestrator<S: ?Sized> {
    search_budget: Option<u32>,
    solver: S,
}

impl<S: Solver> Orchestrator<S> {
    pub fn new(solver: S, search_budget: Option<u32>) -> Self {
        Self {
            search_budget,
            solver,
        }
    }
}

impl<S: Solver + ?Sized> Orchestrator<S> {
    /// Attempts in the order they are tried.
    pub fn strategies(&self) -> Vec<SearchStrategy> {
        let mut strategies = Vec::with_capacity(2);
        if let Some(budget) = self.search_budget {
            strategies.push(SearchStrategy::CostOptimizing { budget });
        }
        strategies.push(SearchStrategy::Relaxed);
        strategies
    }

    /// Run the solver on `problem` and return its raw output.
    ///
    /// A timeout moves on to the next strategy. Any other solver failure ends
    /// the build immediately.
    pub async fn solve(&self, problem: &Path) -> Result<String, SolveError> {
        for strategy in self.strategies() {
            match self.solver.run(problem, strategy).await {
                Ok(output) => return Ok(output),
                Err(err) if err.is_timeout() => {
                    info!(
                        subsystem = subsystem(strategy),
                        ?strategy,
                        "planner ran out of time"
                    );
                }
                Err(source) => {
                    error!(
                        subsystem = subsystem(strategy),
                        error = %source,
                        "planner failed"
                    );
                    return Err(SolveError::Process { strategy, source });
                }
            }
        }
        warn!(subsystem = "planner/plan/planner", "every planner attempt timed out");
        Err(SolveError::TimedOut)
    }
}

fn subsystem(strategy: SearchStrategy) -> &'static str {
    match strategy {
        SearchStrategy::CostOptimizing { .. } => "planner/plan/planner",
        SearchStrategy::Relaxed => "planner/plan/planner/simple",
    }
}

/// Write the problem file, creating its directory when needed.
pub async fn write_problem(path: &Path, problem: &ProblemDescription) -> Result<(), SolveError> {
    let artifact = |source: io::Error| SolveError::Artifact {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(artifact)?;
    }
    tokio::fs::write(path, problem.to_string())
        .await
        .map_err(artifact)
}

/// Delete the problem file. Failures are logged, never returned.
pub async fn remove_problem(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        warn!(
            subsystem = "planner/plan/cleanup",
            path = %path.display(),
            error = %err,
            "failed to remove problem file"
        );
    }
}
