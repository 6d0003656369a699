//! Domain model shared by the encoder, decoder and stores.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{self, ClockError};

/// Identity of a location taking part in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceId {
    /// A place from the catalog, with persisted pairwise distances.
    Catalog(i64),
    /// A user-defined stop that only exists inside one plan.
    Custom(String),
    /// The traveler's daily start and end point.
    Start,
    /// Synthetic location the planner parks at while waiting for a place to open.
    Wait,
}

impl PlaceId {
    /// Object token used for this location in the problem description.
    pub fn token(&self) -> String {
        match self {
            PlaceId::Catalog(id) => format!("place{}", id),
            PlaceId::Custom(name) => {
                let name: String = name
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                    .collect();
                format!("place{}", name.to_ascii_lowercase())
            }
            PlaceId::Start => "start".to_string(),
            PlaceId::Wait => "wait".to_string(),
        }
    }

    pub fn catalog_id(&self) -> Option<i64> {
        match self {
            PlaceId::Catalog(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Recurring opening hours of a place on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningWindow {
    /// 1 = Monday .. 7 = Sunday.
    pub weekday: u32,
    /// First month (0-based) the window is valid in, or -1 for every month.
    pub month_start: i32,
    /// Last month (0-based, inclusive). Lower than `month_start` wraps the year.
    pub month_end: i32,
    /// Minutes since midnight. Values past 1440 belong to the following day.
    pub time_start: u32,
    pub time_end: u32,
}

impl OpeningWindow {
    /// Open every month on `weekday` between the two clock strings.
    pub fn every_month(weekday: u32, time_start: &str, time_end: &str) -> Result<Self, ClockError> {
        Self::parse(weekday, -1, -1, time_start, time_end)
    }

    pub fn parse(
        weekday: u32,
        month_start: i32,
        month_end: i32,
        time_start: &str,
        time_end: &str,
    ) -> Result<Self, ClockError> {
        Ok(Self {
            weekday,
            month_start,
            month_end,
            time_start: calendar::parse_clock(time_start)?,
            time_end: calendar::parse_clock(time_end)?,
        })
    }

    /// Whether this window is in effect on `date`.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        if calendar::weekday(date) != self.weekday {
            return false;
        }
        self.month_start == -1 || calendar::month_in_range(date, self.month_start, self.month_end)
    }
}

/// A point of interest, or one of the sentinel locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub coordinates: Option<Coordinates>,
    /// Visit duration in minutes.
    pub time_spent: f64,
    /// Empty means open all day, every day.
    pub windows: Vec<OpeningWindow>,
}

impl Place {
    pub fn catalog(id: i64, coordinates: Coordinates, time_spent: f64) -> Self {
        Self {
            id: PlaceId::Catalog(id),
            coordinates: Some(coordinates),
            time_spent,
            windows: Vec::new(),
        }
    }

    pub fn custom(
        name: impl Into<String>,
        coordinates: Option<Coordinates>,
        time_spent: f64,
    ) -> Self {
        Self {
            id: PlaceId::Custom(name.into()),
            coordinates,
            time_spent,
            windows: Vec::new(),
        }
    }

    /// The traveler's start location.
    pub fn start(coordinates: Coordinates) -> Self {
        Self {
            id: PlaceId::Start,
            coordinates: Some(coordinates),
            time_spent: 0.0,
            windows: Vec::new(),
        }
    }

    /// The waiting sentinel. It has no coordinates, so every leg to it is free.
    pub fn wait() -> Self {
        Self {
            id: PlaceId::Wait,
            coordinates: None,
            time_spent: 0.0,
            windows: Vec::new(),
        }
    }

    pub fn with_window(mut self, window: OpeningWindow) -> Self {
        self.windows.push(window);
        self
    }

    pub fn token(&self) -> String {
        self.id.token()
    }

    /// Visit duration, shortened when the plan asks for a quicker pace.
    pub fn visit_duration(&self, quicker: bool, quicker_factor: f64) -> f64 {
        if quicker {
            self.time_spent / quicker_factor
        } else {
            self.time_spent
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Walking,
    Car,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Car => "car",
        }
    }
}

/// Resolved cost of one leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Travel {
    pub meters: f64,
    pub minutes: f64,
    pub mode: TravelMode,
}

impl Travel {
    pub const ZERO: Travel = Travel {
        meters: 0.0,
        minutes: 0.0,
        mode: TravelMode::Walking,
    };
}

/// Persisted distance between two catalog places. Symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub place_a: i64,
    pub place_b: i64,
    pub meters: f64,
    pub minutes: f64,
    pub mode: TravelMode,
}

impl Distance {
    pub fn travel(&self) -> Travel {
        Travel {
            meters: self.meters,
            minutes: self.minutes,
            mode: self.mode,
        }
    }
}

/// Kind of a scheduled itinerary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Place,
    Start,
    Wait,
    Rest,
    Custom,
}

impl ItemKind {
    /// Numeric code stored by the persistence collaborator.
    pub fn code(&self) -> u8 {
        match self {
            ItemKind::Place => 1,
            ItemKind::Start => 2,
            ItemKind::Wait => 3,
            ItemKind::Rest => 4,
            ItemKind::Custom => 5,
        }
    }
}

/// One scheduled unit of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryItem {
    pub plan_id: i64,
    /// Set only for catalog places.
    pub place_id: Option<i64>,
    /// 0-based offset into the trip.
    pub day: u32,
    /// 0-based position within the day.
    pub order: u32,
    pub kind: ItemKind,
    pub start_time: String,
    pub end_time: String,
    /// Minutes.
    pub time_spent: f64,
    /// Minutes to the next item, or -1 for the last item of the day.
    pub travel_next: i32,
    pub travel_mode: TravelMode,
}
