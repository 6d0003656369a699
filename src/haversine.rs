//! Great-circle travel estimates for locations outside the distance table.
//!
//! Straight-line distance is stretched by an empirical correction factor
//! (measured road distance over geometric distance across the catalog) and
//! turned into time at walking speed, or driving speed for long legs.

use crate::model::{Coordinates, Travel, TravelMode};

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Average ratio between routed and straight-line distance.
pub const DEFAULT_CORRECTION: f64 = 1.238_349_390_905_191_2;

/// 1.4 m/s.
pub const WALKING_M_PER_MIN: f64 = 84.0;

/// ~50 km/h.
pub const DRIVING_M_PER_MIN: f64 = 830.0;

/// Legs that take longer than this on foot are driven.
pub const WALKING_LIMIT_MIN: f64 = 60.0;

/// Haversine-based travel estimator.
#[derive(Debug, Clone)]
pub struct GeoEstimator {
    pub correction: f64,
    pub walking_m_per_min: f64,
    pub driving_m_per_min: f64,
    pub walking_limit_min: f64,
}

impl Default for GeoEstimator {
    fn default() -> Self {
        Self {
            correction: DEFAULT_CORRECTION,
            walking_m_per_min: WALKING_M_PER_MIN,
            driving_m_per_min: DRIVING_M_PER_MIN,
            walking_limit_min: WALKING_LIMIT_MIN,
        }
    }
}

impl GeoEstimator {
    /// Haversine distance between two points in whole meters.
    pub fn haversine_m(from: Coordinates, to: Coordinates) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lon = (to.lon - from.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        (EARTH_RADIUS_M * c).round()
    }

    /// Estimated travel between two coordinates.
    pub fn estimate(&self, from: Coordinates, to: Coordinates) -> Travel {
        let meters = Self::haversine_m(from, to) * self.correction;
        let walking = meters / self.walking_m_per_min;

        if walking > self.walking_limit_min {
            Travel {
                meters,
                minutes: meters / self.driving_m_per_min,
                mode: TravelMode::Car,
            }
        } else {
            Travel {
                meters,
                minutes: walking,
                mode: TravelMode::Walking,
            }
        }
    }
}
