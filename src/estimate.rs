//! Rough number of days a set of places needs.

use thiserror::Error;

use crate::distance::DistanceError;
use crate::model::Place;
use crate::traits::TravelCost;

/// Fewest places an estimate is made for.
pub const MIN_PLACES: usize = 3;

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("need at least 3 places, got {0}")]
    TooFewPlaces(usize),
    #[error("day window {start}..{end} leaves no time")]
    EmptyDay { start: u32, end: u32 },
    #[error(transparent)]
    Distance(#[from] DistanceError),
}

/// Days needed to visit `places` from `start`.
///
/// Every place is charged the average leg over all place pairs plus the
/// round trip from the start, on top of its own visit time.
pub fn trip_days<C: TravelCost + ?Sized>(
    places: &[Place],
    start: &Place,
    day_start: u32,
    day_end: u32,
    cost: &C,
) -> Result<u32, EstimateError> {
    if places.len() < MIN_PLACES {
        return Err(EstimateError::TooFewPlaces(places.len()));
    }
    if day_end <= day_start {
        return Err(EstimateError::EmptyDay {
            start: day_start,
            end: day_end,
        });
    }

    let mut legs = 0u32;
    let mut travel = 0.0;
    for (i, place) in places.iter().enumerate() {
        for other in &places[i + 1..] {
            travel += cost.travel(place, other)?.minutes;
            legs += 1;
        }
        travel += 2.0 * cost.travel(start, place)?.minutes;
        legs += 2;
    }

    let visiting: f64 = places.iter().map(|place| place.time_spent).sum();
    let average = travel / f64::from(legs);
    let total = average * places.len() as f64 + visiting;
    Ok((total / f64::from(day_end - day_start)).ceil() as u32)
}
