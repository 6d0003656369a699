//! One plan build from job to terminal status.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, instrument, warn};

use crate::config::PlannerConfig;
use crate::decoder::{DecodeError, Decoder};
use crate::encoder::{EncodeError, Encoder};
use crate::model::ItineraryItem;
use crate::orchestrator::{self, Orchestrator, SolveError};
use crate::problem::ProblemDescription;
use crate::request::PlanJob;
use crate::status::PlanStatus;
use crate::store::StoreError;
use crate::traits::{PlanStore, Solver, TravelCost};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error("decoding failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("storing itinerary failed: {0}")]
    Persist(#[source] StoreError),
    #[error("plan task aborted: {0}")]
    Task(#[from] JoinError),
}

impl PlanError {
    /// Terminal status a plan ends in after this failure.
    pub fn status(&self) -> PlanStatus {
        match self {
            PlanError::Solve(SolveError::TimedOut) => PlanStatus::TimedOut,
            PlanError::Decode(DecodeError::NoSolution) => PlanStatus::NoSolution,
            _ => PlanStatus::InternalError,
        }
    }

    pub fn subsystem(&self) -> &'static str {
        match self {
            PlanError::Encode(_) | PlanError::Task(_) => "planner/plan/creator",
            PlanError::Solve(SolveError::Artifact { .. }) => "planner/plan/writer",
            PlanError::Solve(_) => "planner/plan/planner",
            PlanError::Decode(_) => "planner/plan/parser",
            PlanError::Persist(_) => "planner/plan/db",
        }
    }
}

/// Builds plans: encode, solve, decode, store, set status.
pub struct Planner {
    config: PlannerConfig,
    cost: Arc<dyn TravelCost>,
    store: Arc<dyn PlanStore>,
    orchestrator: Orchestrator<Arc<dyn Solver>>,
}

impl Planner {
    pub fn new(
        config: PlannerConfig,
        cost: Arc<dyn TravelCost>,
        store: Arc<dyn PlanStore>,
        solver: Arc<dyn Solver>,
    ) -> Self {
        let orchestrator = Orchestrator::new(solver, config.search_budget);
        Self {
            config,
            cost,
            store,
            orchestrator,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn PlanStore> {
        &self.store
    }

    /// Produce the itinerary of `job` without touching the plan store.
    ///
    /// The problem file is removed once the solver is done with it, whatever
    /// the outcome.
    pub async fn run(&self, job: &PlanJob) -> Result<Vec<ItineraryItem>, PlanError> {
        let problem = self.encode(job).await?;
        let path = self.config.problem_path(job.plan_id);
        orchestrator::write_problem(&path, &problem).await?;

        let items = match self.orchestrator.solve(&path).await {
            Ok(output) => self.decode(job, output).await,
            Err(err) => Err(err.into()),
        };
        orchestrator::remove_problem(&path).await;
        items
    }

    /// Run `job`, store its items and move the plan to its terminal status.
    #[instrument(name = "plan", skip(self, job), fields(plan_id = job.plan_id, owner = job.owner))]
    pub async fn build(&self, job: PlanJob) -> PlanStatus {
        let outcome = match self.run(&job).await {
            Ok(items) => self
                .store
                .insert_items(job.plan_id, &items)
                .map(|()| items.len())
                .map_err(PlanError::Persist),
            Err(err) => Err(err),
        };

        let status = match outcome {
            Ok(count) => {
                info!(subsystem = "planner/plan/planner", items = count, "plan built");
                PlanStatus::Ok
            }
            Err(err) => {
                let status = err.status();
                match status {
                    PlanStatus::TimedOut | PlanStatus::NoSolution => {
                        warn!(subsystem = err.subsystem(), error = %err, ?status, "plan not solved")
                    }
                    _ => error!(subsystem = err.subsystem(), error = %err, "plan build failed"),
                }
                status
            }
        };
        self.settle(job.plan_id, status)
    }

    /// Build `job` on the runtime.
    pub fn spawn(self: &Arc<Self>, job: PlanJob) -> JoinHandle<PlanStatus> {
        let planner = Arc::clone(self);
        tokio::spawn(async move { planner.build(job).await })
    }

    /// Settle a plan whose build never reported back.
    pub fn abandon(&self, plan_id: i64, owner: i64, err: &PlanError) -> PlanStatus {
        error!(
            plan_id,
            owner,
            subsystem = err.subsystem(),
            error = %err,
            "plan build abandoned"
        );
        self.settle(plan_id, PlanStatus::InternalError)
    }

    fn settle(&self, plan_id: i64, status: PlanStatus) -> PlanStatus {
        if let Err(err) = self.store.set_status(plan_id, status) {
            error!(
                plan_id,
                subsystem = "planner/plan/db",
                error = %err,
                ?status,
                "failed to record plan status"
            );
        }
        status
    }

    async fn encode(&self, job: &PlanJob) -> Result<ProblemDescription, PlanError> {
        let cost = Arc::clone(&self.cost);
        let job = job.clone();
        let domain = self.config.domain_name.clone();
        let factor = self.config.quicker_factor;
        let problem = tokio::task::spawn_blocking(move || {
            Encoder::new(&*cost, domain, factor).encode(&job)
        })
        .await??;
        Ok(problem)
    }

    async fn decode(
        &self,
        job: &PlanJob,
        output: String,
    ) -> Result<Vec<ItineraryItem>, PlanError> {
        let cost = Arc::clone(&self.cost);
        let job = job.clone();
        let factor = self.config.quicker_factor;
        let items = tokio::task::spawn_blocking(move || {
            Decoder::new(&*cost, factor).decode(
                job.plan_id,
                &output,
                &job.places,
                &job.start,
                job.day_start,
                job.quicker,
            )
        })
        .await??;
        Ok(items)
    }
}
