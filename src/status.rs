//! Plan build lifecycle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of a plan build attempt.
///
/// A plan starts in `Planning`; the pipeline writes exactly one of `Ok`,
/// `InternalError`, `TimedOut` or `NoSolution`. `Completed` is written later by
/// an external scheduler once the trip is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanStatus {
    InternalError,
    Ok,
    Planning,
    TimedOut,
    NoSolution,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("plan status cannot move from {from:?} to {to:?}")]
pub struct TransitionError {
    pub from: PlanStatus,
    pub to: PlanStatus,
}

impl PlanStatus {
    /// Numeric code stored by the persistence collaborator.
    pub fn code(&self) -> i8 {
        match self {
            PlanStatus::InternalError => -1,
            PlanStatus::Ok => 0,
            PlanStatus::Planning => 1,
            PlanStatus::TimedOut => 2,
            PlanStatus::NoSolution => 3,
            PlanStatus::Completed => 4,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(PlanStatus::InternalError),
            0 => Some(PlanStatus::Ok),
            1 => Some(PlanStatus::Planning),
            2 => Some(PlanStatus::TimedOut),
            3 => Some(PlanStatus::NoSolution),
            4 => Some(PlanStatus::Completed),
            _ => None,
        }
    }

    /// Whether the build attempt has finished.
    pub fn is_final(&self) -> bool {
        !matches!(self, PlanStatus::Planning)
    }

    /// Check and perform a move to `next`.
    pub fn transition(self, next: PlanStatus) -> Result<PlanStatus, TransitionError> {
        let allowed = match self {
            PlanStatus::Planning => matches!(
                next,
                PlanStatus::Ok
                    | PlanStatus::InternalError
                    | PlanStatus::TimedOut
                    | PlanStatus::NoSolution
            ),
            PlanStatus::Ok => next == PlanStatus::Completed,
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(TransitionError { from: self, to: next })
        }
    }
}
