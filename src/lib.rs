//! route-planner core
//!
//! Incrementally builds a walking/running route from clicked waypoints,
//! snapping each leg through a pluggable routing backend and keeping a
//! per-vertex elevation profile in step with the stitched polyline.

pub mod adapter;
pub mod builder;
pub mod config;
pub mod elevation;
pub mod error;
pub mod graphhopper;
pub mod haversine;
pub mod openrouteservice;
pub mod osrm;
pub mod polyline;
pub mod projector;
pub mod session;
pub mod snapshot;
pub mod traits;
