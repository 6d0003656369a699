//! In-memory stores for development and testing.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::model::{Distance, ItineraryItem};
use crate::status::{PlanStatus, TransitionError};
use crate::traits::{DistanceSink, DistanceStore, PlanStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("plan {0} not found")]
    PlanNotFound(i64),
    #[error("plan {0} already exists")]
    PlanExists(i64),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("store error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone)]
struct PlanRecord {
    owner: i64,
    status: PlanStatus,
    items: Vec<ItineraryItem>,
}

/// Plan store keeping everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: RwLock<HashMap<i64, PlanRecord>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self, plan_id: i64) -> Result<Option<i64>, StoreError> {
        let plans = self
            .plans
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(plans.get(&plan_id).map(|plan| plan.owner))
    }
}

impl PlanStore for InMemoryPlanStore {
    fn create_plan(&self, plan_id: i64, owner: i64) -> Result<(), StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        if plans.contains_key(&plan_id) {
            return Err(StoreError::PlanExists(plan_id));
        }
        plans.insert(
            plan_id,
            PlanRecord {
                owner,
                status: PlanStatus::Planning,
                items: Vec::new(),
            },
        );
        Ok(())
    }

    fn status(&self, plan_id: i64) -> Result<Option<PlanStatus>, StoreError> {
        let plans = self
            .plans
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(plans.get(&plan_id).map(|plan| plan.status))
    }

    fn set_status(&self, plan_id: i64, status: PlanStatus) -> Result<(), StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let plan = plans
            .get_mut(&plan_id)
            .ok_or(StoreError::PlanNotFound(plan_id))?;
        plan.status = plan.status.transition(status)?;
        Ok(())
    }

    fn insert_items(&self, plan_id: i64, items: &[ItineraryItem]) -> Result<(), StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let plan = plans
            .get_mut(&plan_id)
            .ok_or(StoreError::PlanNotFound(plan_id))?;
        plan.items.extend_from_slice(items);
        Ok(())
    }

    fn items(&self, plan_id: i64) -> Result<Vec<ItineraryItem>, StoreError> {
        let plans = self
            .plans
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        plans
            .get(&plan_id)
            .map(|plan| plan.items.clone())
            .ok_or(StoreError::PlanNotFound(plan_id))
    }
}

/// Catalog distance table keyed by unordered place pair.
#[derive(Debug, Default)]
pub struct InMemoryDistanceStore {
    distances: RwLock<HashMap<(i64, i64), Distance>>,
}

impl InMemoryDistanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_distances(distances: impl IntoIterator<Item = Distance>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.distances.write() {
            for distance in distances {
                map.insert(pair_key(distance.place_a, distance.place_b), distance);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.distances.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn pair_key(a: i64, b: i64) -> (i64, i64) {
    if a <= b { (a, b) } else { (b, a) }
}

impl DistanceStore for InMemoryDistanceStore {
    fn distance_between(&self, a: i64, b: i64) -> Result<Option<Distance>, StoreError> {
        let distances = self
            .distances
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(distances.get(&pair_key(a, b)).cloned())
    }
}

impl DistanceSink for InMemoryDistanceStore {
    fn save_distances(&self, distances: &[Distance]) -> Result<(), StoreError> {
        let mut map = self
            .distances
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        for distance in distances {
            map.insert(pair_key(distance.place_a, distance.place_b), distance.clone());
        }
        Ok(())
    }
}
