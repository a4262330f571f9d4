//! Polyline representation for route geometries.
//!
//! Coordinates are always `(latitude, longitude)` inside the crate. Backends
//! that speak GeoJSON send longitude-first positions; those are decoded here,
//! at the boundary, and never leak past the provider modules.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<(f64, f64)> for Coord {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Raw geometry as returned by a routing backend.
///
/// Elevations are only present when the backend embeds them in its
/// positions; the adapter backfills them otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedGeometry {
    pub vertices: Vec<Coord>,
    pub elevations: Option<Vec<f64>>,
}

impl RoutedGeometry {
    pub fn new(vertices: Vec<Coord>, elevations: Option<Vec<f64>>) -> Self {
        Self {
            vertices,
            elevations,
        }
    }

    /// Decodes GeoJSON-style `[lng, lat]` / `[lng, lat, ele]` positions.
    ///
    /// Elevations are kept only when every position carries a third
    /// component. A position with fewer than two components is malformed.
    pub fn from_lng_lat_positions(positions: &[Vec<f64>]) -> Result<Self, ProviderError> {
        let mut vertices = Vec::with_capacity(positions.len());
        let mut elevations = Vec::with_capacity(positions.len());
        let mut all_have_elevation = true;

        for position in positions {
            match position.as_slice() {
                [lng, lat] => {
                    vertices.push(Coord::new(*lat, *lng));
                    all_have_elevation = false;
                }
                [lng, lat, ele, ..] => {
                    vertices.push(Coord::new(*lat, *lng));
                    elevations.push(*ele);
                }
                _ => {
                    return Err(ProviderError::Malformed(format!(
                        "position with {} components",
                        position.len()
                    )));
                }
            }
        }

        let elevations = (all_have_elevation && !positions.is_empty()).then_some(elevations);
        Ok(Self::new(vertices, elevations))
    }

    /// Straight two-point line between the endpoints.
    pub fn straight_line(start: Coord, end: Coord) -> Self {
        Self::new(vec![start, end], None)
    }

    /// Checks the geometry is usable as a route segment.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.vertices.len() < 2 {
            return Err(ProviderError::Malformed(format!(
                "expected at least 2 vertices, got {}",
                self.vertices.len()
            )));
        }
        if let Some(bad) = self.vertices.iter().find(|v| !v.is_valid()) {
            return Err(ProviderError::Malformed(format!(
                "invalid vertex ({}, {})",
                bad.lat, bad.lng
            )));
        }
        if let Some(elevations) = &self.elevations {
            if elevations.len() != self.vertices.len() {
                return Err(ProviderError::Malformed(format!(
                    "{} elevations for {} vertices",
                    elevations.len(),
                    self.vertices.len()
                )));
            }
            if elevations.iter().any(|e| !e.is_finite()) {
                return Err(ProviderError::Malformed(
                    "non-finite elevation".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A routed segment with one elevation sample per vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedPath {
    vertices: Vec<Coord>,
    elevations: Vec<f64>,
}

impl RoutedPath {
    /// Pairs vertices with elevations. Returns `None` when the lengths differ.
    pub fn new(vertices: Vec<Coord>, elevations: Vec<f64>) -> Option<Self> {
        (vertices.len() == elevations.len()).then_some(Self {
            vertices,
            elevations,
        })
    }

    /// Straight line between the endpoints with a constant elevation.
    pub fn straight_line(start: Coord, end: Coord, elevation_m: f64) -> Self {
        Self {
            vertices: vec![start, end],
            elevations: vec![elevation_m, elevation_m],
        }
    }

    pub fn vertices(&self) -> &[Coord] {
        &self.vertices
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Coord>, Vec<f64>) {
        (self.vertices, self.elevations)
    }
}
