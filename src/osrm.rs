//! OSRM HTTP adapter for routed and map-matched segments.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::polyline::{Coord, RoutedGeometry};
use crate::traits::RoutingProvider;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "foot".to_string(),
        }
    }
}

/// Which OSRM service answers the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsrmService {
    /// Shortest path over the road graph (`/route/v1`).
    Route,
    /// Snap the two points onto the network as a trace (`/match/v1`).
    Match,
}

impl OsrmService {
    fn path_segment(self) -> &'static str {
        match self {
            OsrmService::Route => "route",
            OsrmService::Match => "match",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    service: OsrmService,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(
        config: OsrmConfig,
        service: OsrmService,
        client: reqwest::blocking::Client,
    ) -> Self {
        Self {
            config,
            service,
            client,
        }
    }

    fn url(&self, start: Coord, end: Coord) -> String {
        format!(
            "{}/{}/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            self.service.path_segment(),
            self.config.profile,
            start.lng,
            start.lat,
            end.lng,
            end.lat
        )
    }
}

impl RoutingProvider for OsrmClient {
    fn name(&self) -> &'static str {
        match self.service {
            OsrmService::Route => "osrm",
            OsrmService::Match => "osrm-match",
        }
    }

    fn route_between(&self, start: Coord, end: Coord) -> Result<RoutedGeometry, ProviderError> {
        let url = self.url(start, end);
        tracing::debug!(provider = self.name(), %url, "requesting segment");

        let body = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmResponse>())?;

        if body.code != "Ok" {
            return Err(ProviderError::Rejected {
                provider: self.name(),
                code: body.code,
            });
        }

        let candidates = match self.service {
            OsrmService::Route => body.routes,
            OsrmService::Match => body.matchings,
        };
        let first = candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        RoutedGeometry::from_lng_lat_positions(&first.geometry.coordinates)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    routes: Option<Vec<OsrmRoute>>,
    matchings: Option<Vec<OsrmRoute>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: LineString,
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<Vec<f64>>,
}
