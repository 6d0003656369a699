//! Seams between the planning core and its collaborators.
//!
//! Persistence and the external planner live behind these traits so the
//! pipeline can run against in-memory stores and scripted solvers.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::distance::DistanceError;
use crate::model::{Distance, ItineraryItem, Place, Travel};
use crate::solver::{SearchStrategy, SolverError};
use crate::status::PlanStatus;
use crate::store::StoreError;

/// Read access to the persisted catalog distance table.
pub trait DistanceStore: Send + Sync {
    /// Distance between two catalog places, in either direction.
    fn distance_between(&self, a: i64, b: i64) -> Result<Option<Distance>, StoreError>;
}

/// Write access to the catalog distance table, used by the importer.
pub trait DistanceSink {
    fn save_distances(&self, distances: &[Distance]) -> Result<(), StoreError>;
}

/// Resolves the cost of travelling between two locations.
pub trait TravelCost: Send + Sync {
    fn travel(&self, from: &Place, to: &Place) -> Result<Travel, DistanceError>;
}

/// Plan records and their itinerary rows.
pub trait PlanStore: Send + Sync {
    /// Register a freshly created plan in the `Planning` state.
    fn create_plan(&self, plan_id: i64, owner: i64) -> Result<(), StoreError>;

    fn status(&self, plan_id: i64) -> Result<Option<PlanStatus>, StoreError>;

    fn set_status(&self, plan_id: i64, status: PlanStatus) -> Result<(), StoreError>;

    /// Insert all rows of a plan at once. Either every row is stored or none.
    fn insert_items(&self, plan_id: i64, items: &[ItineraryItem]) -> Result<(), StoreError>;

    fn items(&self, plan_id: i64) -> Result<Vec<ItineraryItem>, StoreError>;
}

/// An external planner that turns a problem file into a textual trace.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn run(&self, problem: &Path, strategy: SearchStrategy) -> Result<String, SolverError>;
}

impl<T: DistanceStore + ?Sized> DistanceStore for &T {
    fn distance_between(&self, a: i64, b: i64) -> Result<Option<Distance>, StoreError> {
        (**self).distance_between(a, b)
    }
}

impl<T: DistanceStore + ?Sized> DistanceStore for Arc<T> {
    fn distance_between(&self, a: i64, b: i64) -> Result<Option<Distance>, StoreError> {
        (**self).distance_between(a, b)
    }
}

#[async_trait]
impl<T: Solver + ?Sized> Solver for Arc<T> {
    async fn run(&self, problem: &Path, strategy: SearchStrategy) -> Result<String, SolverError> {
        (**self).run(problem, strategy).await
    }
}
