//! Real New York City locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Points sit on walkable paths in
//! and around Central Park and Lower Manhattan.

#![allow(dead_code)]

use route_planner::polyline::Coord;

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

    pub fn coord(&self) -> Coord {
        Coord::new(self.lat, self.lng)
    }
}

// ============================================================================
// Central Park loop
// ============================================================================

pub const CENTRAL_PARK_LOOP: &[Location] = &[
    Location::new("Columbus Circle", 40.7680, -73.9819),
    Location::new("Sheep Meadow", 40.7719, -73.9749),
    Location::new("Bethesda Fountain", 40.7740, -73.9708),
    Location::new("Jacqueline Kennedy Onassis Reservoir", 40.7851, -73.9627),
    Location::new("Harlem Meer", 40.7968, -73.9521),
    Location::new("Great Hill", 40.7962, -73.9577),
];

// ============================================================================
// Lower Manhattan
// ============================================================================

pub const LOWER_MANHATTAN: &[Location] = &[
    Location::new("City Hall Park", 40.7128, -74.0060),
    Location::new("Brooklyn Bridge Walkway", 40.7115, -74.0026),
    Location::new("Battery Park", 40.7033, -74.0170),
    Location::new("Hudson River Greenway at Chambers St", 40.7175, -74.0139),
];

/// The three-point scenario route used by the builder properties.
pub const SCENARIO_A: Coord = Coord::new(40.0, -74.0);
pub const SCENARIO_B: Coord = Coord::new(40.01, -74.0);
pub const SCENARIO_C: Coord = Coord::new(40.01, -74.01);
