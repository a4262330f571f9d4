//! Provider adapter: the configured routing and elevation backends behind
//! one infallible [`SegmentSource`].
//!
//! Any failure of the active routing backend (transport error, timeout,
//! non-2xx, rejection, unparseable or degenerate geometry) yields a straight
//! two-point line at `default_elevation_m`. There is no retry and no
//! attempt at another backend. Elevation failures keep the routed geometry
//! and default only the samples.

use std::time::Duration;

use crate::config::{ElevationService, PlannerConfig, RoutingService};
use crate::elevation::{ConstantElevation, OpenElevationClient, OpenMeteoClient};
use crate::error::ProviderError;
use crate::graphhopper::GraphHopperClient;
use crate::haversine::StraightLineRouter;
use crate::openrouteservice::{OpenRouteServiceClient, RouteProxyClient};
use crate::osrm::{OsrmClient, OsrmService};
use crate::polyline::{Coord, RoutedPath};
use crate::snapshot::RoutedSegment;
use crate::traits::{ElevationProvider, RoutingProvider, SegmentSource};

pub struct ProviderAdapter {
    routing: Box<dyn RoutingProvider>,
    elevation: Box<dyn ElevationProvider>,
    default_elevation_m: f64,
}

impl ProviderAdapter {
    pub fn new(
        routing: Box<dyn RoutingProvider>,
        elevation: Box<dyn ElevationProvider>,
        default_elevation_m: f64,
    ) -> Self {
        Self {
            routing,
            elevation,
            default_elevation_m,
        }
    }

    /// Builds the backends named in `config`, sharing one HTTP client whose
    /// timeout bounds every request.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let routing: Box<dyn RoutingProvider> = match &config.routing {
            RoutingService::Osrm(osrm) => Box::new(OsrmClient::new(
                osrm.clone(),
                OsrmService::Route,
                client.clone(),
            )),
            RoutingService::OsrmMatch(osrm) => Box::new(OsrmClient::new(
                osrm.clone(),
                OsrmService::Match,
                client.clone(),
            )),
            RoutingService::GraphHopper(graphhopper) => {
                Box::new(GraphHopperClient::new(graphhopper.clone(), client.clone()))
            }
            RoutingService::OpenRouteService(ors) => {
                Box::new(OpenRouteServiceClient::new(ors.clone(), client.clone()))
            }
            RoutingService::Proxy(proxy) => {
                Box::new(RouteProxyClient::new(proxy.clone(), client.clone()))
            }
            RoutingService::StraightLine => Box::new(StraightLineRouter),
        };

        let elevation: Box<dyn ElevationProvider> = match &config.elevation {
            ElevationService::OpenElevation { base_url } => {
                Box::new(OpenElevationClient::new(base_url.clone(), client))
            }
            ElevationService::OpenMeteo { base_url } => {
                Box::new(OpenMeteoClient::new(base_url.clone(), client))
            }
            ElevationService::Constant => {
                Box::new(ConstantElevation::new(config.default_elevation_m))
            }
        };

        tracing::info!(
            routing = routing.name(),
            elevation = elevation.name(),
            timeout_secs = config.timeout_secs,
            "provider adapter ready"
        );

        Ok(Self::new(routing, elevation, config.default_elevation_m))
    }

    pub fn routing_name(&self) -> &'static str {
        self.routing.name()
    }

    pub fn elevation_name(&self) -> &'static str {
        self.elevation.name()
    }

    pub fn default_elevation_m(&self) -> f64 {
        self.default_elevation_m
    }

    /// Asks the active routing backend for a segment without falling back.
    pub fn try_route(&self, start: Coord, end: Coord) -> Result<RoutedPath, ProviderError> {
        let geometry = self.routing.route_between(start, end)?;
        geometry.validate()?;

        let elevations = match geometry.elevations {
            Some(elevations) => elevations,
            None => self.backfill_elevations(&geometry.vertices),
        };

        RoutedPath::new(geometry.vertices, elevations)
            .ok_or_else(|| ProviderError::Malformed("elevation count mismatch".to_string()))
    }

    fn backfill_elevations(&self, vertices: &[Coord]) -> Vec<f64> {
        match self.elevation.elevations_for(vertices) {
            Ok(elevations) if elevations.len() == vertices.len() => elevations,
            Ok(elevations) => {
                tracing::warn!(
                    provider = self.elevation.name(),
                    expected = vertices.len(),
                    got = elevations.len(),
                    "elevation count mismatch; using default elevation"
                );
                vec![self.default_elevation_m; vertices.len()]
            }
            Err(err) => {
                tracing::warn!(
                    provider = self.elevation.name(),
                    error = %err,
                    "elevation lookup failed; using default elevation"
                );
                vec![self.default_elevation_m; vertices.len()]
            }
        }
    }
}

impl SegmentSource for ProviderAdapter {
    fn route_between(&self, start: Coord, end: Coord) -> RoutedSegment {
        match self.try_route(start, end) {
            Ok(path) => {
                tracing::debug!(
                    provider = self.routing.name(),
                    vertices = path.len(),
                    "segment routed"
                );
                RoutedSegment::from_provider(path, self.routing.name())
            }
            Err(err) => {
                tracing::warn!(
                    provider = self.routing.name(),
                    error = %err,
                    "routing failed; using straight-line fallback"
                );
                RoutedSegment::fallback(start, end, self.default_elevation_m, err.to_string())
            }
        }
    }

    fn elevation_at(&self, point: Coord) -> f64 {
        match self.elevation.elevation_at(point) {
            Ok(elevation) if elevation.is_finite() => elevation,
            Ok(_) | Err(_) => {
                tracing::warn!(
                    provider = self.elevation.name(),
                    lat = point.lat,
                    lng = point.lng,
                    "elevation lookup failed; using default elevation"
                );
                self.default_elevation_m
            }
        }
    }
}
