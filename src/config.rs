//! Planner configuration: which backends to use and how long to wait.

use serde::{Deserialize, Serialize};

use crate::elevation::{OpenElevationClient, OpenMeteoClient};
use crate::error::ConfigError;
use crate::graphhopper::GraphHopperConfig;
use crate::openrouteservice::{OpenRouteServiceConfig, ProxyConfig};
use crate::osrm::OsrmConfig;

/// Active routing backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingService {
    Osrm(OsrmConfig),
    OsrmMatch(OsrmConfig),
    GraphHopper(GraphHopperConfig),
    OpenRouteService(OpenRouteServiceConfig),
    Proxy(ProxyConfig),
    StraightLine,
}

/// Active elevation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElevationService {
    OpenElevation { base_url: String },
    OpenMeteo { base_url: String },
    /// Every sample is `default_elevation_m`.
    Constant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub routing: RoutingService,
    pub elevation: ElevationService,
    /// Elevation used when a backend fails or none is configured.
    pub default_elevation_m: f64,
    /// Upper bound on any single backend request.
    pub timeout_secs: u64,
    /// Fetch segments concurrently during a full rebuild.
    pub parallel_rebuild: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            routing: RoutingService::Osrm(OsrmConfig::default()),
            elevation: ElevationService::OpenElevation {
                base_url: OpenElevationClient::DEFAULT_URL.to_string(),
            },
            default_elevation_m: 0.0,
            timeout_secs: 10,
            parallel_rebuild: false,
        }
    }
}

impl PlannerConfig {
    /// Reads `ROUTE_PLANNER_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, starting from defaults.
    ///
    /// Recognised keys:
    /// `ROUTE_PLANNER_ROUTING` (`osrm`, `osrm-match`, `graphhopper`,
    /// `openrouteservice`, `proxy`, `straight-line`),
    /// `ROUTE_PLANNER_ROUTING_URL`, `ROUTE_PLANNER_ROUTING_PROFILE`,
    /// `OPENROUTESERVICE_API_KEY`, `GRAPHHOPPER_API_KEY`,
    /// `ROUTE_PLANNER_ELEVATION` (`open-elevation`, `open-meteo`, `constant`),
    /// `ROUTE_PLANNER_ELEVATION_URL`, `ROUTE_PLANNER_DEFAULT_ELEVATION`,
    /// `ROUTE_PLANNER_TIMEOUT_SECS`, `ROUTE_PLANNER_PARALLEL_REBUILD`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let url = lookup("ROUTE_PLANNER_ROUTING_URL");
        let profile = lookup("ROUTE_PLANNER_ROUTING_PROFILE");

        if let Some(kind) = lookup("ROUTE_PLANNER_ROUTING") {
            config.routing = match kind.trim() {
                "osrm" | "osrm-match" => {
                    let mut osrm = OsrmConfig::default();
                    if let Some(url) = url {
                        osrm.base_url = url;
                    }
                    if let Some(profile) = profile {
                        osrm.profile = profile;
                    }
                    if kind.trim() == "osrm" {
                        RoutingService::Osrm(osrm)
                    } else {
                        RoutingService::OsrmMatch(osrm)
                    }
                }
                "graphhopper" => {
                    let mut graphhopper = GraphHopperConfig {
                        api_key: lookup("GRAPHHOPPER_API_KEY"),
                        ..Default::default()
                    };
                    if let Some(url) = url {
                        graphhopper.base_url = url;
                    }
                    if let Some(profile) = profile {
                        graphhopper.profile = profile;
                    }
                    RoutingService::GraphHopper(graphhopper)
                }
                "openrouteservice" => {
                    let api_key = lookup("OPENROUTESERVICE_API_KEY")
                        .ok_or(ConfigError::Missing("OPENROUTESERVICE_API_KEY"))?;
                    let mut ors = OpenRouteServiceConfig {
                        api_key,
                        ..Default::default()
                    };
                    if let Some(url) = url {
                        ors.base_url = url;
                    }
                    if let Some(profile) = profile {
                        ors.profile = profile;
                    }
                    RoutingService::OpenRouteService(ors)
                }
                "proxy" => RoutingService::Proxy(ProxyConfig {
                    url: url.ok_or(ConfigError::Missing("ROUTE_PLANNER_ROUTING_URL"))?,
                }),
                "straight-line" => RoutingService::StraightLine,
                other => {
                    return Err(ConfigError::UnknownService {
                        kind: "routing",
                        value: other.to_string(),
                    });
                }
            };
        }

        if let Some(kind) = lookup("ROUTE_PLANNER_ELEVATION") {
            let url = lookup("ROUTE_PLANNER_ELEVATION_URL");
            config.elevation = match kind.trim() {
                "open-elevation" => ElevationService::OpenElevation {
                    base_url: url.unwrap_or_else(|| OpenElevationClient::DEFAULT_URL.to_string()),
                },
                "open-meteo" => ElevationService::OpenMeteo {
                    base_url: url.unwrap_or_else(|| OpenMeteoClient::DEFAULT_URL.to_string()),
                },
                "constant" => ElevationService::Constant,
                other => {
                    return Err(ConfigError::UnknownService {
                        kind: "elevation",
                        value: other.to_string(),
                    });
                }
            };
        }

        if let Some(value) = lookup("ROUTE_PLANNER_DEFAULT_ELEVATION") {
            config.default_elevation_m = parse("ROUTE_PLANNER_DEFAULT_ELEVATION", &value)?;
        }
        if let Some(value) = lookup("ROUTE_PLANNER_TIMEOUT_SECS") {
            config.timeout_secs = parse("ROUTE_PLANNER_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("ROUTE_PLANNER_PARALLEL_REBUILD") {
            config.parallel_rebuild = parse("ROUTE_PLANNER_PARALLEL_REBUILD", &value)?;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
