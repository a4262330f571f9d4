//! Deterministic segment sources.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use route_planner::adapter::ProviderAdapter;
use route_planner::elevation::ConstantElevation;
use route_planner::error::ProviderError;
use route_planner::haversine::StraightLineRouter;
use route_planner::polyline::{Coord, RoutedGeometry, RoutedPath};
use route_planner::snapshot::RoutedSegment;
use route_planner::traits::{RoutingProvider, SegmentSource};

/// Routing backend that always fails.
pub struct AlwaysFailRouter;

impl RoutingProvider for AlwaysFailRouter {
    fn name(&self) -> &'static str {
        "always-fail"
    }

    fn route_between(&self, _start: Coord, _end: Coord) -> Result<RoutedGeometry, ProviderError> {
        Err(ProviderError::Rejected {
            provider: "always-fail",
            code: "NoRoute".to_string(),
        })
    }
}

/// Adapter whose routing always fails, leaving only the straight-line default.
pub fn failing_adapter(default_elevation_m: f64) -> ProviderAdapter {
    ProviderAdapter::new(
        Box::new(AlwaysFailRouter),
        Box::new(ConstantElevation::new(default_elevation_m)),
        default_elevation_m,
    )
}

/// Straight lines with constant elevation.
pub fn straight_line_adapter(elevation_m: f64) -> ProviderAdapter {
    ProviderAdapter::new(
        Box::new(StraightLineRouter),
        Box::new(ConstantElevation::new(elevation_m)),
        elevation_m,
    )
}

/// Splits each leg into `steps` pieces along a sine-shaped hill, so interior
/// vertices carry elevation the endpoints do not.
pub struct HillySource {
    pub steps: usize,
    pub calls: AtomicUsize,
}

impl HillySource {
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SegmentSource for HillySource {
    fn route_between(&self, start: Coord, end: Coord) -> RoutedSegment {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let steps = self.steps.max(1);
        let mut vertices = Vec::with_capacity(steps + 1);
        let mut elevations = Vec::with_capacity(steps + 1);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let vertex = if i == steps {
                end
            } else {
                Coord::new(
                    start.lat + (end.lat - start.lat) * t,
                    start.lng + (end.lng - start.lng) * t,
                )
            };
            vertices.push(vertex);
            elevations.push(50.0 + 20.0 * (std::f64::consts::PI * t).sin());
        }
        RoutedSegment::from_provider(
            RoutedPath::new(vertices, elevations).expect("aligned lengths"),
            "hilly",
        )
    }

    fn elevation_at(&self, _point: Coord) -> f64 {
        50.0
    }
}
