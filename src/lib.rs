//! itinerary-planner core
//!
//! Turns a set of places with opening hours into a day-by-day itinerary by
//! encoding a planning problem, running an external planner on it and
//! replaying the returned action trace against a wall clock.

pub mod calendar;
pub mod config;
pub mod decoder;
pub mod distance;
pub mod encoder;
pub mod estimate;
pub mod haversine;
pub mod model;
pub mod orchestrator;
pub mod osrm;
pub mod pipeline;
pub mod problem;
pub mod queue;
pub mod request;
pub mod solver;
pub mod status;
pub mod store;
pub mod trace;
pub mod traits;
