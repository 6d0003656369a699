//! Real Madrid locations for itinerary fixtures.
//!
//! Coordinates sourced from OpenStreetMap. All of them are routable with a
//! Spain or Comunidad de Madrid OSRM extract.

use itinerary_planner::model::Coordinates;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

// ============================================================================
// Hotels and squares (good start locations)
// ============================================================================

pub const STARTS: &[Location] = &[
    Location::new("Puerta del Sol", 40.4166980, -3.7032080),
    Location::new("Hotel Ritz", 40.4155830, -3.6929720),
    Location::new("Riu Plaza España", 40.4235050, -3.7114320),
];

// ============================================================================
// Museums and sights in walking distance of each other
// ============================================================================

pub const SIGHTS: &[Location] = &[
    Location::new("Museo del Prado", 40.4137820, -3.6921270),
    Location::new("Museo Reina Sofía", 40.4080290, -3.6945220),
    Location::new("Palacio Real", 40.4179550, -3.7143120),
    Location::new("Plaza Mayor", 40.4155110, -3.7074010),
    Location::new("Palacio de Cristal", 40.4137230, -3.6825640),
    Location::new("Templo de Debod", 40.4240250, -3.7177650),
];

// ============================================================================
// Day trips (driving distance)
// ============================================================================

pub const DAY_TRIPS: &[Location] = &[
    Location::new("Catedral de Toledo", 39.8569200, -4.0234750),
    Location::new("Acueducto de Segovia", 40.9479650, -4.1177980),
    Location::new("Monasterio de El Escorial", 40.5890160, -4.1476390),
];

pub fn sol() -> &'static Location {
    &STARTS[0]
}
