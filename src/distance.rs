//! Travel cost between any two plan locations.

use thiserror::Error;

use crate::haversine::GeoEstimator;
use crate::model::{Place, PlaceId, Travel};
use crate::store::StoreError;
use crate::traits::{DistanceStore, TravelCost};

#[derive(Debug, Error)]
pub enum DistanceError {
    #[error("no stored distance between places {0} and {1}")]
    Missing(i64, i64),
    #[error("distance lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Resolves travel cost from the distance table when both ends are catalog
/// places, and from a geometric estimate otherwise.
#[derive(Debug, Clone)]
pub struct DistanceResolver<S> {
    store: S,
    estimator: GeoEstimator,
}

impl<S: DistanceStore> DistanceResolver<S> {
    pub fn new(store: S) -> Self {
        Self::with_estimator(store, GeoEstimator::default())
    }

    pub fn with_estimator(store: S, estimator: GeoEstimator) -> Self {
        Self { store, estimator }
    }

    pub fn resolve(&self, a: &Place, b: &Place) -> Result<Travel, DistanceError> {
        let (Some(from), Some(to)) = (a.coordinates, b.coordinates) else {
            return Ok(Travel::ZERO);
        };

        match (&a.id, &b.id) {
            (PlaceId::Catalog(x), PlaceId::Catalog(y)) => {
                if x == y {
                    return Ok(Travel::ZERO);
                }
                self.store
                    .distance_between(*x, *y)?
                    .map(|distance| distance.travel())
                    .ok_or(DistanceError::Missing(*x, *y))
            }
            _ => Ok(self.estimator.estimate(from, to)),
        }
    }
}

impl<S: DistanceStore> TravelCost for DistanceResolver<S> {
    fn travel(&self, from: &Place, to: &Place) -> Result<Travel, DistanceError> {
        self.resolve(from, to)
    }
}
