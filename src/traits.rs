//! Core traits for the route builder and its providers.
//!
//! Backends implement the fallible provider traits. The builder only sees
//! [`SegmentSource`], whose methods always produce a usable result.

use crate::error::ProviderError;
use crate::polyline::{Coord, RoutedGeometry};
use crate::snapshot::RoutedSegment;

/// A routing backend that snaps a path between two points.
pub trait RoutingProvider: Send + Sync {
    /// Short identifier used in logs and segment origins.
    fn name(&self) -> &'static str;

    fn route_between(&self, start: Coord, end: Coord) -> Result<RoutedGeometry, ProviderError>;
}

/// An elevation backend.
pub trait ElevationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn elevation_at(&self, point: Coord) -> Result<f64, ProviderError>;

    /// Elevations for many points, in order.
    ///
    /// Backends with a batch endpoint should override this.
    fn elevations_for(&self, points: &[Coord]) -> Result<Vec<f64>, ProviderError> {
        points.iter().map(|point| self.elevation_at(*point)).collect()
    }
}

/// Infallible source of segments and elevations for the route builder.
pub trait SegmentSource: Send + Sync {
    fn route_between(&self, start: Coord, end: Coord) -> RoutedSegment;

    fn elevation_at(&self, point: Coord) -> f64;
}

impl<T: SegmentSource + ?Sized> SegmentSource for &T {
    fn route_between(&self, start: Coord, end: Coord) -> RoutedSegment {
        (**self).route_between(start, end)
    }

    fn elevation_at(&self, point: Coord) -> f64 {
        (**self).elevation_at(point)
    }
}

impl<T: SegmentSource + ?Sized> SegmentSource for Box<T> {
    fn route_between(&self, start: Coord, end: Coord) -> RoutedSegment {
        (**self).route_between(start, end)
    }

    fn elevation_at(&self, point: Coord) -> f64 {
        (**self).elevation_at(point)
    }
}
