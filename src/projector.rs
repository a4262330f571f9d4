//! Derived route statistics for display.
//!
//! Everything here is computed from a [`RouteSnapshot`] at vertex level,
//! so climbs between waypoints are counted even when the waypoints
//! themselves sit at the same height.

use serde::{Deserialize, Serialize};

use crate::haversine::cumulative_distances;
use crate::snapshot::RouteSnapshot;

const MILES_PER_METER: f64 = 0.000621371;
const FEET_PER_METER: f64 = 3.28084;

/// One point of the distance-vs-elevation chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationPoint {
    pub distance_m: f64,
    pub elevation_m: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteStats {
    pub total_distance_m: f64,
    pub elevation_series: Vec<ElevationPoint>,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
}

impl RouteStats {
    pub fn from_snapshot(snapshot: &RouteSnapshot) -> Self {
        let elevation_series: Vec<ElevationPoint> = cumulative_distances(&snapshot.route_vertices)
            .zip(snapshot.elevation_samples.iter().copied())
            .map(|(distance_m, elevation_m)| ElevationPoint {
                distance_m,
                elevation_m,
            })
            .collect();

        let (elevation_gain_m, elevation_loss_m) = snapshot
            .elevation_samples
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .fold((0.0, 0.0), |(gain, loss), delta| {
                if delta > 0.0 {
                    (gain + delta, loss)
                } else {
                    (gain, loss - delta)
                }
            });

        Self {
            total_distance_m: elevation_series
                .last()
                .map(|p| p.distance_m)
                .unwrap_or(0.0),
            elevation_series,
            elevation_gain_m,
            elevation_loss_m,
        }
    }

    pub fn has_elevation_change(&self) -> bool {
        self.elevation_gain_m > 0.0 || self.elevation_loss_m > 0.0
    }
}

/// Display unit system. Miles pair with feet, kilometres with metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn toggle(self) -> Self {
        match self {
            DistanceUnit::Miles => DistanceUnit::Kilometers,
            DistanceUnit::Kilometers => DistanceUnit::Miles,
        }
    }

    pub fn distance_label(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mi",
            DistanceUnit::Kilometers => "km",
        }
    }

    pub fn elevation_label(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "ft",
            DistanceUnit::Kilometers => "m",
        }
    }

    pub fn distance_from_meters(self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Miles => meters * MILES_PER_METER,
            DistanceUnit::Kilometers => meters / 1000.0,
        }
    }

    /// Feet are rounded to whole numbers; metres pass through.
    pub fn elevation_from_meters(self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Miles => (meters * FEET_PER_METER).round(),
            DistanceUnit::Kilometers => meters,
        }
    }

    /// Distance with two decimals, e.g. `"3.11"`.
    pub fn format_distance(self, meters: f64) -> String {
        format!("{:.2}", self.distance_from_meters(meters))
    }
}

/// Centred moving average over `window` samples. Distances are untouched.
///
/// Series shorter than three points are returned as-is.
pub fn smooth_elevation(series: &[ElevationPoint], window: usize) -> Vec<ElevationPoint> {
    if series.len() < 3 || window < 2 {
        return series.to_vec();
    }
    let half = window / 2;
    (0..series.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(series.len() - 1);
            let neighbours = &series[lo..=hi];
            let sum: f64 = neighbours.iter().map(|p| p.elevation_m).sum();
            ElevationPoint {
                distance_m: series[i].distance_m,
                elevation_m: sum / neighbours.len() as f64,
            }
        })
        .collect()
}
