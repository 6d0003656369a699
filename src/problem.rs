//! Planning problem model and its text rendering.
//!
//! The encoder builds a [`ProblemDescription`] out of typed facts; the
//! `Display` impl is the only place that knows the planner's concrete syntax.

use std::fmt;

/// One initial-state fact.
#[derive(Debug, Clone, PartialEq)]
pub enum Fact {
    DayStart(u32),
    DayEnd(u32),
    CurrentTime(u32),
    CurrentDay(String),
    CurrentPlace(String),
    Heuristic(f64),
    NextDay { day: String, next: String },
    Opens { place: String, day: String, minutes: u32 },
    Closes { place: String, day: String, minutes: u32 },
    VisitDuration { place: String, minutes: f64 },
    Unvisited(String),
    Distance { from: String, to: String, meters: u64 },
    TravelTime { from: String, to: String, minutes: u64 },
}

/// One conjunct of the goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Goal {
    Visited(String),
    CurrentPlace(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    MinimizeHeuristic,
}

/// A closed-form planning problem ready to hand to the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemDescription {
    pub name: String,
    pub domain: String,
    pub places: Vec<String>,
    pub days: Vec<String>,
    pub init: Vec<Fact>,
    pub goals: Vec<Goal>,
    pub metric: Metric,
}

impl ProblemDescription {
    pub fn facts(&self) -> &[Fact] {
        &self.init
    }
}

/// Whole numbers render without a fraction; everything else as-is.
fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::DayStart(minutes) => write!(f, "(= (day-start) {})", minutes),
            Fact::DayEnd(minutes) => write!(f, "(= (day-end) {})", minutes),
            Fact::CurrentTime(minutes) => write!(f, "(= (current-time) {})", minutes),
            Fact::CurrentDay(day) => write!(f, "(current-day {})", day),
            Fact::CurrentPlace(place) => write!(f, "(current-place {})", place),
            Fact::Heuristic(value) => write!(f, "(= (heuristic) {})", number(*value)),
            Fact::NextDay { day, next } => write!(f, "(next-day {} {})", day, next),
            Fact::Opens { place, day, minutes } => {
                write!(f, "(= (opens {} {}) {})", place, day, minutes)
            }
            Fact::Closes { place, day, minutes } => {
                write!(f, "(= (closes {} {}) {})", place, day, minutes)
            }
            Fact::VisitDuration { place, minutes } => {
                write!(f, "(= (visit-duration {}) {})", place, number(*minutes))
            }
            Fact::Unvisited(place) => write!(f, "(unvisited {})", place),
            Fact::Distance { from, to, meters } => {
                write!(f, "(= (distance {} {}) {})", from, to, meters)
            }
            Fact::TravelTime { from, to, minutes } => {
                write!(f, "(= (travel-time {} {}) {})", from, to, minutes)
            }
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Visited(place) => write!(f, "(visited {})", place),
            Goal::CurrentPlace(place) => write!(f, "(current-place {})", place),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::MinimizeHeuristic => write!(f, "(:metric minimize (heuristic))"),
        }
    }
}

impl fmt::Display for ProblemDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(define (problem {})", self.name)?;
        writeln!(f, "  (:domain {})", self.domain)?;
        writeln!(f, "  (:objects")?;
        writeln!(f, "    {} - place", self.places.join(" "))?;
        writeln!(f, "    {} - day", self.days.join(" "))?;
        writeln!(f, "  )")?;
        writeln!(f, "  (:init")?;
        for fact in &self.init {
            writeln!(f, "    {}", fact)?;
        }
        writeln!(f, "  )")?;
        writeln!(f, "  (:goal (and")?;
        for goal in &self.goals {
            writeln!(f, "    {}", goal)?;
        }
        writeln!(f, "  ))")?;
        writeln!(f, "  {}", self.metric)?;
        writeln!(f, ")")
    }
}
