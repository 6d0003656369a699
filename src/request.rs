//! Plan requests and the jobs built from them.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{self, MINUTES_PER_DAY};
use crate::model::{Coordinates, Place, PlaceId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("a plan needs at least one place")]
    NoPlaces,
    #[error("place {0} appears more than once")]
    DuplicatePlace(String),
    #[error("custom place '{0}' has no letters or digits to name it by")]
    UnnamedPlace(String),
    #[error("trip ends on {end} before it starts on {start}")]
    InvertedDates { start: NaiveDate, end: NaiveDate },
    #[error("day ends at minute {end} before it starts at minute {start}")]
    InvertedDayWindow { start: u32, end: u32 },
    #[error("day window {start}..{end} is outside two calendar days")]
    DayWindowOutOfRange { start: u32, end: u32 },
}

/// A user's request to plan a trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub plan_id: i64,
    /// User owning the plan. Carried into every log event.
    pub owner: i64,
    pub places: Vec<Place>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Minutes since midnight the traveler starts each day.
    pub day_start: u32,
    /// Minutes since midnight the traveler ends each day.
    pub day_end: u32,
    pub start: Coordinates,
    #[serde(default)]
    pub quicker: bool,
}

impl PlanRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.places.is_empty() {
            return Err(RequestError::NoPlaces);
        }

        // Places are told apart by their object token, which drops case,
        // punctuation and non-ASCII letters from custom names.
        let mut seen = HashSet::with_capacity(self.places.len());
        for place in &self.places {
            let token = place.token();
            if let PlaceId::Custom(name) = &place.id {
                if token == PlaceId::Custom(String::new()).token() {
                    return Err(RequestError::UnnamedPlace(name.clone()));
                }
            }
            if !seen.insert(token) {
                return Err(RequestError::DuplicatePlace(place.token()));
            }
        }

        if self.start_date > self.end_date {
            return Err(RequestError::InvertedDates {
                start: self.start_date,
                end: self.end_date,
            });
        }

        if self.day_start > self.day_end {
            return Err(RequestError::InvertedDayWindow {
                start: self.day_start,
                end: self.day_end,
            });
        }

        if self.day_end > 2 * MINUTES_PER_DAY {
            return Err(RequestError::DayWindowOutOfRange {
                start: self.day_start,
                end: self.day_end,
            });
        }

        Ok(())
    }

    /// Validate and expand the request into a plan job.
    pub fn into_job(self) -> Result<PlanJob, RequestError> {
        self.validate()?;
        let days = calendar::trip_days(self.start_date, self.end_date);
        Ok(PlanJob {
            plan_id: self.plan_id,
            owner: self.owner,
            places: self.places,
            days,
            start: Place::start(self.start),
            day_start: self.day_start,
            day_end: self.day_end,
            quicker: self.quicker,
        })
    }
}

/// Everything one plan build needs, with the trip days expanded.
#[derive(Debug, Clone)]
pub struct PlanJob {
    pub plan_id: i64,
    pub owner: i64,
    pub places: Vec<Place>,
    pub days: Vec<NaiveDate>,
    pub start: Place,
    pub day_start: u32,
    pub day_end: u32,
    pub quicker: bool,
}
