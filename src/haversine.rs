//! Great-circle distances and the straight-line router.
//!
//! Spherical earth model; good to about a metre at street and trail scale.
//! The straight-line router ignores roads entirely but is always available.

use crate::error::ProviderError;
use crate::polyline::{Coord, RoutedGeometry};
use crate::traits::RoutingProvider;

/// Mean earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle surface distance between two points in meters.
pub fn distance_meters(from: Coord, to: Coord) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Total length of a polyline in meters.
pub fn path_length_meters(vertices: &[Coord]) -> f64 {
    vertices
        .windows(2)
        .map(|pair| distance_meters(pair[0], pair[1]))
        .sum()
}

/// Running distance totals along a polyline, one per vertex.
///
/// Lazy. Call again, or clone before iterating, to restart the series.
pub fn cumulative_distances(vertices: &[Coord]) -> CumulativeDistances<'_> {
    CumulativeDistances {
        vertices,
        index: 0,
        total: 0.0,
    }
}

#[derive(Debug, Clone)]
pub struct CumulativeDistances<'a> {
    vertices: &'a [Coord],
    index: usize,
    total: f64,
}

impl Iterator for CumulativeDistances<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.index >= self.vertices.len() {
            return None;
        }
        if self.index > 0 {
            self.total += distance_meters(self.vertices[self.index - 1], self.vertices[self.index]);
        }
        self.index += 1;
        Some(self.total)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vertices.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CumulativeDistances<'_> {}

/// Routing backend that connects the endpoints directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineRouter;

impl RoutingProvider for StraightLineRouter {
    fn name(&self) -> &'static str {
        "straight-line"
    }

    fn route_between(&self, start: Coord, end: Coord) -> Result<RoutedGeometry, ProviderError> {
        Ok(RoutedGeometry::straight_line(start, end))
    }
}
