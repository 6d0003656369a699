//! Background dispatch of plan builds.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::pipeline::{PlanError, Planner};
use crate::request::PlanJob;
use crate::status::PlanStatus;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("plan queue is closed")]
    Closed,
}

/// Terminal outcome of one queued build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanReport {
    pub plan_id: i64,
    pub status: PlanStatus,
}

/// Accepts plan jobs and builds each one on its own task.
///
/// Submitting returns as soon as the job is queued. Outcomes arrive on the
/// report receiver handed out by [`PlanQueue::start`].
#[derive(Debug, Clone)]
pub struct PlanQueue {
    jobs: mpsc::Sender<PlanJob>,
}

impl PlanQueue {
    /// Start the dispatcher. It stops once every queue handle is dropped.
    pub fn start(
        planner: Arc<Planner>,
        capacity: usize,
    ) -> (Self, mpsc::UnboundedReceiver<PlanReport>) {
        let (jobs, mut incoming) = mpsc::channel::<PlanJob>(capacity.max(1));
        let (reports, outcomes) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(job) = incoming.recv().await {
                let planner = Arc::clone(&planner);
                let reports = reports.clone();
                tokio::spawn(async move {
                    let (plan_id, owner) = (job.plan_id, job.owner);
                    let status = match planner.spawn(job).await {
                        Ok(status) => status,
                        Err(err) => planner.abandon(plan_id, owner, &PlanError::Task(err)),
                    };
                    if reports.send(PlanReport { plan_id, status }).is_err() {
                        debug!(plan_id, "report receiver dropped");
                    }
                });
            }
            debug!("plan queue drained");
        });

        (Self { jobs }, outcomes)
    }

    pub async fn submit(&self, job: PlanJob) -> Result<(), QueueError> {
        let plan_id = job.plan_id;
        self.jobs.send(job).await.map_err(|_| {
            warn!(plan_id, "plan submitted to a closed queue");
            QueueError::Closed
        })
    }
}
