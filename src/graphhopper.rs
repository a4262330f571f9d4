//! GraphHopper routing adapter.
//!
//! Requests unencoded points with elevation so each vertex arrives as
//! `[lng, lat, ele]`.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::polyline::{Coord, RoutedGeometry};
use crate::traits::RoutingProvider;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphHopperConfig {
    pub base_url: String,
    pub profile: String,
    pub api_key: Option<String>,
}

impl Default for GraphHopperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graphhopper.com/api/1".to_string(),
            profile: "foot".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphHopperClient {
    config: GraphHopperConfig,
    client: reqwest::blocking::Client,
}

impl GraphHopperClient {
    pub fn new(config: GraphHopperConfig, client: reqwest::blocking::Client) -> Self {
        Self { config, client }
    }

    fn query(&self, start: Coord, end: Coord) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("point", format!("{:.6},{:.6}", start.lat, start.lng)),
            ("point", format!("{:.6},{:.6}", end.lat, end.lng)),
            ("profile", self.config.profile.clone()),
            ("points_encoded", "false".to_string()),
            ("elevation", "true".to_string()),
        ];
        if let Some(key) = &self.config.api_key {
            query.push(("key", key.clone()));
        }
        query
    }
}

impl RoutingProvider for GraphHopperClient {
    fn name(&self) -> &'static str {
        "graphhopper"
    }

    fn route_between(&self, start: Coord, end: Coord) -> Result<RoutedGeometry, ProviderError> {
        let url = format!("{}/route", self.config.base_url.trim_end_matches('/'));
        tracing::debug!(provider = self.name(), %url, "requesting segment");

        let body = self
            .client
            .get(url)
            .query(&self.query(start, end))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<GraphHopperResponse>())?;

        let path = body
            .paths
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        RoutedGeometry::from_lng_lat_positions(&path.points.coordinates)
    }
}

#[derive(Debug, Deserialize)]
struct GraphHopperResponse {
    #[serde(default)]
    paths: Vec<GraphHopperPath>,
}

#[derive(Debug, Deserialize)]
struct GraphHopperPath {
    points: LineString,
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<Vec<f64>>,
}
