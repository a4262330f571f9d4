//! HTTP backend tests against mock servers.
//!
//! Each mock server runs on a tokio runtime owned by the test; the
//! providers under test use the blocking client from the test thread.

mod fixtures;

use std::time::Duration;

use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use route_planner::adapter::ProviderAdapter;
use route_planner::builder::RouteBuilder;
use route_planner::config::{ElevationService, PlannerConfig, RoutingService};
use route_planner::graphhopper::GraphHopperConfig;
use route_planner::openrouteservice::{OpenRouteServiceConfig, ProxyConfig};
use route_planner::osrm::OsrmConfig;
use route_planner::polyline::Coord;
use route_planner::snapshot::SegmentOrigin;
use route_planner::traits::SegmentSource;

use fixtures::{SCENARIO_A, SCENARIO_B, SCENARIO_C};

// ============================================================================
// Test Infrastructure
// ============================================================================

struct MockBackend {
    server: MockServer,
    runtime: Runtime,
}

impl MockBackend {
    fn start() -> Self {
        let runtime = Runtime::new().expect("tokio runtime");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn uri(&self) -> String {
        self.server.uri()
    }
}

const DEFAULT_ELEVATION: f64 = 100.0;

fn config(routing: RoutingService, elevation: ElevationService) -> PlannerConfig {
    PlannerConfig {
        routing,
        elevation,
        default_elevation_m: DEFAULT_ELEVATION,
        timeout_secs: 1,
        parallel_rebuild: false,
    }
}

fn osrm(backend: &MockBackend) -> OsrmConfig {
    OsrmConfig {
        base_url: backend.uri(),
        profile: "foot".to_string(),
    }
}

fn adapter(config: &PlannerConfig) -> ProviderAdapter {
    ProviderAdapter::from_config(config).expect("build adapter")
}

/// Matches a JSON request body regardless of key order.
fn json_body(expected: serde_json::Value) -> impl Fn(&Request) -> bool + Send + Sync {
    move |request: &Request| {
        serde_json::from_slice::<serde_json::Value>(&request.body)
            .map(|body| body == expected)
            .unwrap_or(false)
    }
}

/// OSRM-style body that bends each leg through a point east of its midpoint.
fn osrm_detour(request: &Request) -> ResponseTemplate {
    let coords = request.url.path().rsplit('/').next().unwrap_or_default();
    let points: Vec<Vec<f64>> = coords
        .split(';')
        .map(|pair| pair.split(',').map(|v| v.parse().unwrap()).collect())
        .collect();
    let (start, end) = (&points[0], &points[1]);
    let mid = vec![(start[0] + end[0]) / 2.0 + 0.001, (start[1] + end[1]) / 2.0];
    ResponseTemplate::new(200).set_body_json(json!({
        "code": "Ok",
        "routes": [{ "geometry": { "type": "LineString", "coordinates": [start, mid, end] } }]
    }))
}

// ============================================================================
// OSRM
// ============================================================================

#[test]
fn osrm_route_is_decoded_latitude_first() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(method("GET"))
            .and(path("/route/v1/foot/-74.000000,40.000000;-74.000000,40.010000"))
            .and(query_param("geometries", "geojson"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "Ok",
                "routes": [{ "geometry": { "type": "LineString", "coordinates": [
                    [-74.0, 40.0], [-73.999, 40.005], [-74.0, 40.01]
                ] } }]
            })))
            .expect(1),
    );

    let adapter = adapter(&config(
        RoutingService::Osrm(osrm(&backend)),
        ElevationService::Constant,
    ));
    let segment = adapter.route_between(SCENARIO_A, SCENARIO_B);

    assert_eq!(
        segment.path.vertices(),
        &[SCENARIO_A, Coord::new(40.005, -73.999), SCENARIO_B]
    );
    assert_eq!(segment.path.elevations(), &[DEFAULT_ELEVATION; 3]);
    assert_eq!(
        segment.origin,
        SegmentOrigin::Provider {
            name: "osrm".to_string()
        }
    );
}

#[test]
fn osrm_rejection_falls_back_without_retry() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(path_regex("^/route/v1/foot/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": "NoRoute" })))
            .expect(1),
    );

    let adapter = adapter(&config(
        RoutingService::Osrm(osrm(&backend)),
        ElevationService::Constant,
    ));
    let segment = adapter.route_between(SCENARIO_A, SCENARIO_B);

    assert_eq!(segment.path.vertices(), &[SCENARIO_A, SCENARIO_B]);
    assert!(segment.origin.is_fallback());
}

#[test]
fn server_error_falls_back() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(path_regex("^/route/v1/"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1),
    );

    let adapter = adapter(&config(
        RoutingService::Osrm(osrm(&backend)),
        ElevationService::Constant,
    ));
    let segment = adapter.route_between(SCENARIO_A, SCENARIO_B);
    assert_eq!(segment.path.len(), 2);
    assert_eq!(segment.path.elevations(), &[DEFAULT_ELEVATION, DEFAULT_ELEVATION]);
}

#[test]
fn unparseable_body_falls_back() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(path_regex("^/route/v1/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>")),
    );

    let adapter = adapter(&config(
        RoutingService::Osrm(osrm(&backend)),
        ElevationService::Constant,
    ));
    assert!(adapter.route_between(SCENARIO_A, SCENARIO_B).origin.is_fallback());
}

#[test]
fn slow_backend_times_out_into_fallback() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(path_regex("^/route/v1/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "code": "Ok", "routes": [] }))
                    .set_delay(Duration::from_secs(3)),
            ),
    );

    let adapter = adapter(&config(
        RoutingService::Osrm(osrm(&backend)),
        ElevationService::Constant,
    ));
    let started = std::time::Instant::now();
    let segment = adapter.route_between(SCENARIO_A, SCENARIO_B);

    assert!(segment.origin.is_fallback());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn osrm_match_reads_matchings() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(path_regex("^/match/v1/foot/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "Ok",
                "matchings": [{ "geometry": { "type": "LineString", "coordinates": [
                    [-74.0, 40.0], [-74.0, 40.004], [-74.0, 40.01]
                ] } }]
            }))),
    );

    let adapter = adapter(&config(
        RoutingService::OsrmMatch(osrm(&backend)),
        ElevationService::Constant,
    ));
    let segment = adapter.route_between(SCENARIO_A, SCENARIO_B);
    assert_eq!(segment.path.len(), 3);
    assert_eq!(
        segment.origin,
        SegmentOrigin::Provider {
            name: "osrm-match".to_string()
        }
    );
}

// ============================================================================
// GraphHopper / OpenRouteService / proxy
// ============================================================================

#[test]
fn graphhopper_embedded_elevation_skips_elevation_service() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(method("GET"))
            .and(path("/route"))
            .and(query_param("point", "40.000000,-74.000000"))
            .and(query_param("point", "40.010000,-74.000000"))
            .and(query_param("points_encoded", "false"))
            .and(query_param("key", "gh-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "paths": [{ "points": { "type": "LineString", "coordinates": [
                    [-74.0, 40.0, 11.0], [-74.0, 40.005, 17.5], [-74.0, 40.01, 13.0]
                ] } }]
            }))),
    );
    backend.mount(
        Mock::given(path("/lookup"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0),
    );

    let adapter = adapter(&config(
        RoutingService::GraphHopper(GraphHopperConfig {
            base_url: backend.uri(),
            profile: "foot".to_string(),
            api_key: Some("gh-key".to_string()),
        }),
        ElevationService::OpenElevation {
            base_url: format!("{}/lookup", backend.uri()),
        },
    ));
    let segment = adapter.route_between(SCENARIO_A, SCENARIO_B);
    assert_eq!(segment.path.elevations(), &[11.0, 17.5, 13.0]);
}

#[test]
fn openrouteservice_posts_lng_lat_with_key() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(method("POST"))
            .and(path("/v2/directions/foot-walking/geojson"))
            .and(header("Authorization", "ors-key"))
            .and(json_body(json!({
                "coordinates": [[-74.0, 40.0], [-74.0, 40.01]],
                "elevation": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[-74.0, 40.0, 5.0], [-74.0, 40.01, 8.0]]
                    }
                }]
            })))
            .expect(1),
    );

    let adapter = adapter(&config(
        RoutingService::OpenRouteService(OpenRouteServiceConfig {
            base_url: backend.uri(),
            profile: "foot-walking".to_string(),
            api_key: "ors-key".to_string(),
        }),
        ElevationService::Constant,
    ));
    let segment = adapter.route_between(SCENARIO_A, SCENARIO_B);
    assert_eq!(segment.path.vertices(), &[SCENARIO_A, SCENARIO_B]);
    assert_eq!(segment.path.elevations(), &[5.0, 8.0]);
    assert!(!segment.origin.is_fallback());
}

#[test]
fn proxy_sends_start_end_pairs() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(method("POST"))
            .and(path("/api/route"))
            .and(json_body(json!({ "start": [40.0, -74.0], "end": [40.01, -74.0] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[-74.0, 40.0, 1.0], [-73.9995, 40.005, 2.0], [-74.0, 40.01, 3.0]]
                    }
                }]
            }))),
    );

    let adapter = adapter(&config(
        RoutingService::Proxy(ProxyConfig {
            url: format!("{}/api/route", backend.uri()),
        }),
        ElevationService::Constant,
    ));
    let segment = adapter.route_between(SCENARIO_A, SCENARIO_B);
    assert_eq!(segment.path.len(), 3);
    assert_eq!(segment.path.elevations(), &[1.0, 2.0, 3.0]);
}

#[test]
fn proxy_without_features_falls_back() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(path("/api/route"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "features": [] }))),
    );

    let adapter = adapter(&config(
        RoutingService::Proxy(ProxyConfig {
            url: format!("{}/api/route", backend.uri()),
        }),
        ElevationService::Constant,
    ));
    assert!(adapter.route_between(SCENARIO_A, SCENARIO_B).origin.is_fallback());
}

// ============================================================================
// Elevation services
// ============================================================================

#[test]
fn open_elevation_backfills_routed_vertices() {
    let backend = MockBackend::start();
    backend.mount(Mock::given(path_regex("^/route/v1/")).respond_with(osrm_detour));
    backend.mount(
        Mock::given(method("POST"))
            .and(path("/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    { "latitude": 40.0, "longitude": -74.0, "elevation": 10.0 },
                    { "latitude": 40.005, "longitude": -73.999, "elevation": 15.0 },
                    { "latitude": 40.01, "longitude": -74.0, "elevation": 12.0 }
                ]
            })))
            .expect(1),
    );

    let adapter = adapter(&config(
        RoutingService::Osrm(osrm(&backend)),
        ElevationService::OpenElevation {
            base_url: format!("{}/lookup", backend.uri()),
        },
    ));
    let segment = adapter.route_between(SCENARIO_A, SCENARIO_B);
    assert_eq!(segment.path.elevations(), &[10.0, 15.0, 12.0]);
}

#[test]
fn failed_elevation_keeps_route_geometry() {
    let backend = MockBackend::start();
    backend.mount(Mock::given(path_regex("^/route/v1/")).respond_with(osrm_detour));
    backend.mount(Mock::given(path("/lookup")).respond_with(ResponseTemplate::new(503)));

    let adapter = adapter(&config(
        RoutingService::Osrm(osrm(&backend)),
        ElevationService::OpenElevation {
            base_url: format!("{}/lookup", backend.uri()),
        },
    ));
    let segment = adapter.route_between(SCENARIO_A, SCENARIO_B);
    assert_eq!(segment.path.len(), 3);
    assert_eq!(segment.path.elevations(), &[DEFAULT_ELEVATION; 3]);
    assert!(!segment.origin.is_fallback());
    assert_eq!(adapter.elevation_at(SCENARIO_C), DEFAULT_ELEVATION);
}

#[test]
fn open_meteo_point_lookup() {
    let backend = MockBackend::start();
    backend.mount(
        Mock::given(method("GET"))
            .and(path("/v1/elevation"))
            .and(query_param("latitude", "40.010000"))
            .and(query_param("longitude", "-74.010000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elevation": [23.0] }))),
    );

    let adapter = adapter(&config(
        RoutingService::StraightLine,
        ElevationService::OpenMeteo {
            base_url: format!("{}/v1/elevation", backend.uri()),
        },
    ));
    assert_eq!(adapter.elevation_at(SCENARIO_C), 23.0);
}

// ============================================================================
// Builder over HTTP
// ============================================================================

#[test]
fn builder_stitches_routed_segments() {
    let backend = MockBackend::start();
    backend.mount(Mock::given(path_regex("^/route/v1/foot/")).respond_with(osrm_detour));

    let adapter = adapter(&config(
        RoutingService::Osrm(osrm(&backend)),
        ElevationService::Constant,
    ));
    let mut builder = RouteBuilder::new(adapter);
    builder.append_waypoint(SCENARIO_A, None).unwrap();
    builder.append_waypoint(SCENARIO_B, None).unwrap();
    let snapshot = builder.append_waypoint(SCENARIO_C, None).unwrap();

    let counts: Vec<usize> = snapshot.segments.iter().map(|s| s.vertex_count).collect();
    assert_eq!(counts, vec![3, 2]);
    assert_eq!(snapshot.route_vertices.len(), 5);
    assert_eq!(snapshot.route_vertices[2], SCENARIO_B);
    assert_eq!(snapshot.route_vertices[4], SCENARIO_C);
    assert_eq!(snapshot.fallback_segments(), 0);

    let rebuilt = builder.rebuild().unwrap();
    assert_eq!(rebuilt, snapshot);
}
