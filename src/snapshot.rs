//! Route state value types handed out by the builder.

use serde::{Deserialize, Serialize};

use crate::polyline::{Coord, RoutedPath};

/// User-placed anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
    pub elevation: Option<f64>,
}

impl Waypoint {
    pub fn new(point: Coord, elevation: Option<f64>) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
            elevation,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.lat, self.lng)
    }
}

/// Marker role of a waypoint, derived from its position in the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointRole {
    Start,
    Via,
    End,
}

impl WaypointRole {
    /// Role of the waypoint at `index` in a route of `len` waypoints.
    pub fn for_index(index: usize, len: usize) -> Option<Self> {
        if index >= len {
            return None;
        }
        Some(match index {
            0 => WaypointRole::Start,
            i if i + 1 == len => WaypointRole::End,
            _ => WaypointRole::Via,
        })
    }
}

/// Where a segment's geometry came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentOrigin {
    Provider { name: String },
    Fallback { reason: String },
}

impl SegmentOrigin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, SegmentOrigin::Fallback { .. })
    }
}

/// Bookkeeping for one waypoint pair: how many vertices it owns at the tail
/// of the stitched polyline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    pub vertex_count: usize,
    pub origin: SegmentOrigin,
}

/// Output of a [`SegmentSource`](crate::traits::SegmentSource) call.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedSegment {
    pub path: RoutedPath,
    pub origin: SegmentOrigin,
}

impl RoutedSegment {
    pub fn from_provider(path: RoutedPath, name: &str) -> Self {
        Self {
            path,
            origin: SegmentOrigin::Provider {
                name: name.to_string(),
            },
        }
    }

    /// Straight line with constant elevation, used when the backend fails.
    pub fn fallback(start: Coord, end: Coord, elevation_m: f64, reason: impl Into<String>) -> Self {
        Self {
            path: RoutedPath::straight_line(start, end, elevation_m),
            origin: SegmentOrigin::Fallback {
                reason: reason.into(),
            },
        }
    }
}

/// Immutable view of the route for presentation and export.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub waypoints: Vec<Waypoint>,
    pub route_vertices: Vec<Coord>,
    pub elevation_samples: Vec<f64>,
    pub segments: Vec<SegmentDescriptor>,
    pub total_distance_meters: f64,
}

impl RouteSnapshot {
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn role_of(&self, index: usize) -> Option<WaypointRole> {
        WaypointRole::for_index(index, self.waypoints.len())
    }

    /// Vertex-level coordinates paired with their elevation samples.
    pub fn track_points(&self) -> impl Iterator<Item = (Coord, f64)> + '_ {
        self.route_vertices
            .iter()
            .copied()
            .zip(self.elevation_samples.iter().copied())
    }

    /// Number of segments that fell back to a straight line.
    pub fn fallback_segments(&self) -> usize {
        self.segments.iter().filter(|s| s.origin.is_fallback()).count()
    }
}
