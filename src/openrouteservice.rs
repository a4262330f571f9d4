//! OpenRouteService directions adapter and the credential-hiding proxy client.
//!
//! Both speak the same GeoJSON response; only the request differs. The
//! proxy takes `{start, end}` as `[lat, lng]` pairs and forwards them
//! with the key attached server-side.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::polyline::{Coord, RoutedGeometry};
use crate::traits::RoutingProvider;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenRouteServiceConfig {
    pub base_url: String,
    pub profile: String,
    pub api_key: String,
}

impl Default for OpenRouteServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            profile: "foot-walking".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct OpenRouteServiceClient {
    config: OpenRouteServiceConfig,
    client: reqwest::blocking::Client,
}

impl OpenRouteServiceClient {
    pub fn new(config: OpenRouteServiceConfig, client: reqwest::blocking::Client) -> Self {
        Self { config, client }
    }
}

impl RoutingProvider for OpenRouteServiceClient {
    fn name(&self) -> &'static str {
        "openrouteservice"
    }

    fn route_between(&self, start: Coord, end: Coord) -> Result<RoutedGeometry, ProviderError> {
        let url = format!(
            "{}/v2/directions/{}/geojson",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        );
        tracing::debug!(provider = self.name(), %url, "requesting segment");

        let request = DirectionsRequest {
            coordinates: [[start.lng, start.lat], [end.lng, end.lat]],
            elevation: true,
        };

        let body = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, &self.config.api_key)
            .header(
                reqwest::header::ACCEPT,
                "application/json, application/geo+json",
            )
            .json(&request)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<FeatureCollection>())?;

        body.into_geometry()
    }
}

/// Client for a proxy that forwards to OpenRouteService and returns its
/// response unchanged.
#[derive(Debug, Clone)]
pub struct RouteProxyClient {
    config: ProxyConfig,
    client: reqwest::blocking::Client,
}

impl RouteProxyClient {
    pub fn new(config: ProxyConfig, client: reqwest::blocking::Client) -> Self {
        Self { config, client }
    }
}

impl RoutingProvider for RouteProxyClient {
    fn name(&self) -> &'static str {
        "route-proxy"
    }

    fn route_between(&self, start: Coord, end: Coord) -> Result<RoutedGeometry, ProviderError> {
        tracing::debug!(provider = self.name(), url = %self.config.url, "requesting segment");

        let request = ProxyRequest {
            start: [start.lat, start.lng],
            end: [end.lat, end.lng],
        };

        let body = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<FeatureCollection>())?;

        body.into_geometry()
    }
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: [[f64; 2]; 2],
    elevation: bool,
}

#[derive(Debug, Serialize)]
struct ProxyRequest {
    start: [f64; 2],
    end: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: LineString,
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<Vec<f64>>,
}

impl FeatureCollection {
    fn into_geometry(self) -> Result<RoutedGeometry, ProviderError> {
        let feature = self
            .features
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;
        RoutedGeometry::from_lng_lat_positions(&feature.geometry.coordinates)
    }
}
