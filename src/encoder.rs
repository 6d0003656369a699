//! Builds the planning problem for a plan job.

use std::collections::HashSet;

use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::calendar::{self, MINUTES_PER_DAY};
use crate::distance::DistanceError;
use crate::model::{Place, Travel};
use crate::problem::{Fact, Goal, Metric, ProblemDescription};
use crate::request::PlanJob;
use crate::traits::TravelCost;

const END: &str = "end";
const WAIT: &str = "wait";
const START: &str = "start";

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("plan has no places")]
    NoPlaces,
    #[error("plan has no days")]
    NoDays,
    #[error("two places share the object name {0}")]
    DuplicateToken(String),
    #[error("cannot resolve travel from {from} to {to}: {source}")]
    Distance {
        from: String,
        to: String,
        #[source]
        source: DistanceError,
    },
}

/// Encodes plan jobs against a travel cost source.
pub struct Encoder<'a, C: ?Sized> {
    cost: &'a C,
    domain: String,
    quicker_factor: f64,
}

impl<'a, C: TravelCost + ?Sized> Encoder<'a, C> {
    pub fn new(cost: &'a C, domain: impl Into<String>, quicker_factor: f64) -> Self {
        Self {
            cost,
            domain: domain.into(),
            quicker_factor,
        }
    }

    pub fn encode(&self, job: &PlanJob) -> Result<ProblemDescription, EncodeError> {
        if job.places.is_empty() {
            return Err(EncodeError::NoPlaces);
        }
        if job.days.is_empty() {
            return Err(EncodeError::NoDays);
        }
        let mut tokens = HashSet::with_capacity(job.places.len());
        for place in &job.places {
            let token = place.token();
            if !tokens.insert(token.clone()) {
                return Err(EncodeError::DuplicateToken(token));
            }
        }

        let day_tokens: Vec<String> =
            job.days.iter().map(|day| calendar::day_token(*day)).collect();
        let place_tokens: Vec<String> = job.places.iter().map(Place::token).collect();

        let mut init = vec![
            Fact::DayStart(job.day_start),
            Fact::DayEnd(job.day_end),
            Fact::CurrentTime(job.day_start),
            Fact::CurrentDay(day_tokens[0].clone()),
            Fact::CurrentPlace(START.to_string()),
            Fact::Heuristic(0.0),
        ];

        init.extend(day_tokens.windows(2).map(|pair| Fact::NextDay {
            day: pair[0].clone(),
            next: pair[1].clone(),
        }));

        for place in &job.places {
            init.extend(self.hours(place, job));
            init.push(Fact::VisitDuration {
                place: place.token(),
                minutes: place.visit_duration(job.quicker, self.quicker_factor),
            });
            init.push(Fact::Unvisited(place.token()));
        }

        for (from, to) in [(START, WAIT), (WAIT, START)] {
            init.push(Fact::Distance {
                from: from.to_string(),
                to: to.to_string(),
                meters: 0,
            });
            init.push(Fact::TravelTime {
                from: from.to_string(),
                to: to.to_string(),
                minutes: 0,
            });
        }

        let legs = job
            .places
            .par_iter()
            .map(|place| self.legs(place, &job.places, &job.start))
            .collect::<Result<Vec<_>, _>>()?;
        init.extend(legs.into_iter().flatten());

        let mut goals: Vec<Goal> = place_tokens.iter().cloned().map(Goal::Visited).collect();
        goals.push(Goal::CurrentPlace(END.to_string()));

        debug!(
            plan_id = job.plan_id,
            places = place_tokens.len(),
            days = day_tokens.len(),
            facts = init.len(),
            "encoded plan problem"
        );

        Ok(ProblemDescription {
            name: format!("plan{}", job.plan_id),
            domain: self.domain.clone(),
            places: place_tokens,
            days: day_tokens,
            init,
            goals,
            metric: Metric::MinimizeHeuristic,
        })
    }

    /// Opening and closing facts of a place for every trip day it is open.
    fn hours(&self, place: &Place, job: &PlanJob) -> Vec<Fact> {
        let token = place.token();
        let mut facts = Vec::new();

        if place.windows.is_empty() {
            for day in &job.days {
                let day = calendar::day_token(*day);
                facts.push(Fact::Opens {
                    place: token.clone(),
                    day: day.clone(),
                    minutes: 0,
                });
                facts.push(Fact::Closes {
                    place: token.clone(),
                    day,
                    minutes: MINUTES_PER_DAY,
                });
            }
            return facts;
        }

        for window in &place.windows {
            for day in job.days.iter().filter(|day| window.applies_on(**day)) {
                let day = calendar::day_token(*day);
                facts.push(Fact::Opens {
                    place: token.clone(),
                    day: day.clone(),
                    minutes: window.time_start,
                });
                facts.push(Fact::Closes {
                    place: token.clone(),
                    day,
                    minutes: window.time_end,
                });
            }
        }
        facts
    }

    /// Distance and travel-time facts from `place` to every other location.
    fn legs(
        &self,
        place: &Place,
        places: &[Place],
        start: &Place,
    ) -> Result<Vec<Fact>, EncodeError> {
        let token = place.token();
        let mut facts = Vec::with_capacity(places.len() * 2 + 6);

        let home = self.travel(place, start)?;
        let home_meters = home.meters.ceil() as u64;
        let home_minutes = home.minutes.ceil() as u64;
        for (from, to) in [(START.to_string(), token.clone()), (token.clone(), END.to_string())] {
            facts.push(Fact::Distance {
                from: from.clone(),
                to: to.clone(),
                meters: home_meters,
            });
            facts.push(Fact::TravelTime {
                from,
                to,
                minutes: home_minutes,
            });
        }

        facts.push(Fact::Distance {
            from: token.clone(),
            to: WAIT.to_string(),
            meters: 0,
        });
        facts.push(Fact::TravelTime {
            from: token.clone(),
            to: WAIT.to_string(),
            minutes: 0,
        });

        for other in places.iter().filter(|other| other.id != place.id) {
            let travel = self.travel(place, other)?;
            facts.push(Fact::Distance {
                from: token.clone(),
                to: other.token(),
                meters: travel.meters.ceil() as u64,
            });
            facts.push(Fact::TravelTime {
                from: token.clone(),
                to: other.token(),
                minutes: travel.minutes.ceil() as u64,
            });
        }

        Ok(facts)
    }

    fn travel(&self, from: &Place, to: &Place) -> Result<Travel, EncodeError> {
        self.cost
            .travel(from, to)
            .map_err(|source| EncodeError::Distance {
                from: from.token(),
                to: to.token(),
                source,
            })
    }
}
