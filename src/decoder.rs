//! Replays a planner trace against the clock to produce itinerary items.

use std::collections::HashMap;

use thiserror::Error;

use crate::calendar::format_clock;
use crate::distance::DistanceError;
use crate::model::{ItemKind, ItineraryItem, Place, PlaceId, Travel, TravelMode};
use crate::trace::{self, Action, TraceError};
use crate::traits::TravelCost;

/// Length of one planner wait tick, in minutes.
pub const WAIT_TICK_MINUTES: u32 = 15;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("planner found no plan")]
    NoSolution,
    #[error("malformed trace: {0}")]
    Malformed(TraceError),
    #[error("trace references unknown place '{0}'")]
    UnknownPlace(String),
    #[error("place '{0}' is never scheduled by the trace")]
    Unscheduled(String),
    #[error("cannot resolve travel from {from} to {to}: {source}")]
    Distance {
        from: String,
        to: String,
        #[source]
        source: DistanceError,
    },
}

impl From<TraceError> for DecodeError {
    fn from(err: TraceError) -> Self {
        match err {
            TraceError::NoPlan => DecodeError::NoSolution,
            other => DecodeError::Malformed(other),
        }
    }
}

/// Turns planner traces into itinerary items.
pub struct Decoder<'a, C: ?Sized> {
    cost: &'a C,
    quicker_factor: f64,
}

/// Inputs that stay fixed while replaying one trace.
struct Context<'p> {
    plan_id: i64,
    places: &'p [Place],
    start: &'p Place,
    day_start: u32,
    quicker: bool,
    index: HashMap<String, usize>,
}

/// Schedule of one place, filled in as actions reference it.
#[derive(Debug, Clone, Default)]
struct Slot {
    day: Option<u32>,
    order: Option<u32>,
    start: Option<f64>,
    end: Option<f64>,
    travel_next: Option<i32>,
    travel_mode: TravelMode,
}

/// Simulation state folded over the actions.
#[derive(Debug, Clone)]
struct Replay {
    day: u32,
    order: u32,
    clock: f64,
    slots: Vec<Slot>,
    /// Start and wait rows in the order they were emitted.
    emitted: Vec<ItineraryItem>,
}

impl<'a, C: TravelCost + ?Sized> Decoder<'a, C> {
    pub fn new(cost: &'a C, quicker_factor: f64) -> Self {
        Self {
            cost,
            quicker_factor,
        }
    }

    pub fn decode(
        &self,
        plan_id: i64,
        output: &str,
        places: &[Place],
        start: &Place,
        day_start: u32,
        quicker: bool,
    ) -> Result<Vec<ItineraryItem>, DecodeError> {
        let actions = trace::parse(output)?;

        let ctx = Context {
            plan_id,
            places,
            start,
            day_start,
            quicker,
            index: places
                .iter()
                .enumerate()
                .map(|(i, place)| (place.token(), i))
                .collect(),
        };

        let initial = Replay {
            day: 0,
            order: 0,
            clock: f64::from(day_start),
            slots: vec![Slot::default(); places.len()],
            emitted: Vec::new(),
        };

        let replay = actions
            .iter()
            .try_fold(initial, |state, action| self.step(state, action, &ctx))?;

        let mut items = self.collect(replay, &ctx)?;
        sort(&mut items);
        move_start_before_wait(&mut items);
        sort(&mut items);
        Ok(items)
    }

    fn step(
        &self,
        mut state: Replay,
        action: &Action,
        ctx: &Context<'_>,
    ) -> Result<Replay, DecodeError> {
        match action {
            Action::WaitRun { ticks } => {
                let spent = f64::from(WAIT_TICK_MINUTES * ticks.saturating_sub(1));
                let begin = state.clock;
                state.clock += spent;
                state.emitted.push(ItineraryItem {
                    plan_id: ctx.plan_id,
                    place_id: None,
                    day: state.day,
                    order: state.order,
                    kind: ItemKind::Wait,
                    start_time: format_clock(begin),
                    end_time: format_clock(state.clock),
                    time_spent: spent,
                    travel_next: 0,
                    travel_mode: TravelMode::Walking,
                });
                state.order += 1;
            }
            Action::StartDay { place } => {
                let i = ctx.lookup(place)?;
                let travel = self.travel(ctx.start, &ctx.places[i])?;
                state.emitted.push(ItineraryItem {
                    plan_id: ctx.plan_id,
                    place_id: None,
                    day: state.day,
                    order: state.order,
                    kind: ItemKind::Start,
                    start_time: format_clock(state.clock),
                    end_time: format_clock(state.clock),
                    time_spent: 0.0,
                    travel_next: minutes(travel),
                    travel_mode: travel.mode,
                });
                state.order += 1;
                state.clock += travel.minutes;

                let slot = &mut state.slots[i];
                slot.day = Some(state.day);
                slot.order = Some(state.order);
                slot.start = Some(state.clock);
            }
            Action::Move { from, to } => {
                let (src, dst) = (ctx.lookup(from)?, ctx.lookup(to)?);
                let travel = self.travel(&ctx.places[src], &ctx.places[dst])?;
                state.clock += travel.minutes;

                let slot = &mut state.slots[src];
                slot.day = Some(state.day);
                slot.order = Some(state.order);
                slot.travel_next = Some(minutes(travel));
                slot.travel_mode = travel.mode;
                state.order += 1;
            }
            Action::Visit { place } => {
                let i = ctx.lookup(place)?;
                let duration = ctx.places[i].visit_duration(ctx.quicker, self.quicker_factor);
                let slot = &mut state.slots[i];
                slot.start = Some(state.clock);
                state.clock += duration;
                slot.end = Some(state.clock);
            }
            Action::EndDay { place } => {
                let i = ctx.lookup(place)?;
                let travel = self.travel(&ctx.places[i], ctx.start)?;

                let slot = &mut state.slots[i];
                slot.day = Some(state.day);
                slot.order = Some(state.order);
                slot.travel_next = Some(-1);
                slot.travel_mode = travel.mode;
                state.order += 1;
                state.clock += travel.minutes;
            }
            Action::ChangeDay => {
                state.order = 0;
                state.day += 1;
                state.clock = f64::from(ctx.day_start);
            }
        }
        Ok(state)
    }

    /// Emitted rows followed by one row per place.
    fn collect(
        &self,
        replay: Replay,
        ctx: &Context<'_>,
    ) -> Result<Vec<ItineraryItem>, DecodeError> {
        let mut items = replay.emitted;
        for (place, slot) in ctx.places.iter().zip(replay.slots) {
            let unscheduled = || DecodeError::Unscheduled(place.token());
            let (Some(day), Some(order), Some(start), Some(end), Some(travel_next)) =
                (slot.day, slot.order, slot.start, slot.end, slot.travel_next)
            else {
                return Err(unscheduled());
            };

            let kind = match place.id {
                PlaceId::Catalog(_) => ItemKind::Place,
                _ => ItemKind::Custom,
            };

            items.push(ItineraryItem {
                plan_id: ctx.plan_id,
                place_id: place.id.catalog_id(),
                day,
                order,
                kind,
                start_time: format_clock(start),
                end_time: format_clock(end),
                time_spent: place.visit_duration(ctx.quicker, self.quicker_factor),
                travel_next,
                travel_mode: slot.travel_mode,
            });
        }
        Ok(items)
    }

    fn travel(&self, from: &Place, to: &Place) -> Result<Travel, DecodeError> {
        self.cost
            .travel(from, to)
            .map_err(|source| DecodeError::Distance {
                from: from.token(),
                to: to.token(),
                source,
            })
    }
}

impl Context<'_> {
    fn lookup(&self, token: &str) -> Result<usize, DecodeError> {
        self.index
            .get(token)
            .copied()
            .ok_or_else(|| DecodeError::UnknownPlace(token.to_string()))
    }
}

/// Whole minutes of a leg, rounded up like the encoded travel times.
fn minutes(travel: Travel) -> i32 {
    travel.minutes.ceil() as i32
}

fn sort(items: &mut [ItineraryItem]) {
    items.sort_by_key(|item| (item.day, item.order));
}

/// A day that begins by waiting must still open with its `Start` row.
///
/// The start row takes the wait's position and start time; the two rows
/// trade their travel times so the leg to the first place follows the wait.
fn move_start_before_wait(items: &mut [ItineraryItem]) {
    let mut i = 0;
    while i + 1 < items.len() {
        let (head, tail) = items.split_at_mut(i + 1);
        let (wait, start) = (&mut head[i], &mut tail[0]);
        if wait.kind == ItemKind::Wait && start.kind == ItemKind::Start && wait.day == start.day {
            start.start_time = wait.start_time.clone();
            start.end_time = wait.start_time.clone();
            std::mem::swap(&mut wait.travel_next, &mut start.travel_next);
            std::mem::swap(&mut wait.order, &mut start.order);
            i += 2;
        } else {
            i += 1;
        }
    }
}
