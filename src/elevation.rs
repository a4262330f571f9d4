//! Elevation service clients.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::polyline::Coord;
use crate::traits::ElevationProvider;

/// Locations per request accepted by the public elevation APIs.
const BATCH_SIZE: usize = 100;

/// Open-Elevation lookup client (`POST {"locations": [...]}`).
#[derive(Debug, Clone)]
pub struct OpenElevationClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OpenElevationClient {
    pub const DEFAULT_URL: &'static str = "https://api.open-elevation.com/api/v1/lookup";

    pub fn new(base_url: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn fetch_batch(&self, points: &[Coord]) -> Result<Vec<f64>, ProviderError> {
        let request = LookupRequest {
            locations: points
                .iter()
                .map(|p| Location {
                    latitude: p.lat,
                    longitude: p.lng,
                })
                .collect(),
        };

        let body = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<LookupResponse>())?;

        if body.results.len() != points.len() {
            return Err(ProviderError::Malformed(format!(
                "{} elevations for {} locations",
                body.results.len(),
                points.len()
            )));
        }
        Ok(body.results.into_iter().map(|r| r.elevation).collect())
    }
}

impl ElevationProvider for OpenElevationClient {
    fn name(&self) -> &'static str {
        "open-elevation"
    }

    fn elevation_at(&self, point: Coord) -> Result<f64, ProviderError> {
        self.fetch_batch(&[point])?
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)
    }

    fn elevations_for(&self, points: &[Coord]) -> Result<Vec<f64>, ProviderError> {
        let mut elevations = Vec::with_capacity(points.len());
        for batch in points.chunks(BATCH_SIZE) {
            elevations.extend(self.fetch_batch(batch)?);
        }
        Ok(elevations)
    }
}

/// Open-Meteo elevation client (`GET ?latitude=..&longitude=..`).
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OpenMeteoClient {
    pub const DEFAULT_URL: &'static str = "https://api.open-meteo.com/v1/elevation";

    pub fn new(base_url: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn fetch_batch(&self, points: &[Coord]) -> Result<Vec<f64>, ProviderError> {
        let join = |f: fn(&Coord) -> f64| {
            points
                .iter()
                .map(|p| format!("{:.6}", f(p)))
                .collect::<Vec<_>>()
                .join(",")
        };
        let latitudes = join(|p| p.lat);
        let longitudes = join(|p| p.lng);

        let body = self
            .client
            .get(&self.base_url)
            .query(&[("latitude", latitudes), ("longitude", longitudes)])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OpenMeteoResponse>())?;

        let elevations = body.elevation.unwrap_or_default();
        if elevations.len() != points.len() {
            return Err(ProviderError::Malformed(format!(
                "{} elevations for {} locations",
                elevations.len(),
                points.len()
            )));
        }
        Ok(elevations)
    }
}

impl ElevationProvider for OpenMeteoClient {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    fn elevation_at(&self, point: Coord) -> Result<f64, ProviderError> {
        self.fetch_batch(&[point])?
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)
    }

    fn elevations_for(&self, points: &[Coord]) -> Result<Vec<f64>, ProviderError> {
        let mut elevations = Vec::with_capacity(points.len());
        for batch in points.chunks(BATCH_SIZE) {
            elevations.extend(self.fetch_batch(batch)?);
        }
        Ok(elevations)
    }
}

/// Returns the same elevation everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantElevation {
    pub elevation_m: f64,
}

impl ConstantElevation {
    pub fn new(elevation_m: f64) -> Self {
        Self { elevation_m }
    }
}

impl ElevationProvider for ConstantElevation {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn elevation_at(&self, _point: Coord) -> Result<f64, ProviderError> {
        Ok(self.elevation_m)
    }

    fn elevations_for(&self, points: &[Coord]) -> Result<Vec<f64>, ProviderError> {
        Ok(vec![self.elevation_m; points.len()])
    }
}

#[derive(Debug, Serialize)]
struct LookupRequest {
    locations: Vec<Location>,
}

#[derive(Debug, Serialize)]
struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: f64,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    elevation: Option<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_elevation() {
        let provider = ConstantElevation::new(100.0);
        assert_eq!(provider.elevation_at(Coord::new(1.0, 2.0)).unwrap(), 100.0);
        let points = [Coord::new(0.0, 0.0), Coord::new(0.0, 1.0), Coord::new(0.0, 2.0)];
        assert_eq!(provider.elevations_for(&points).unwrap(), vec![100.0; 3]);
    }

    #[test]
    fn test_constant_elevation_empty_batch() {
        let provider = ConstantElevation::new(5.0);
        assert!(provider.elevations_for(&[]).unwrap().is_empty());
    }
}
