//! Test fixtures for route-planner.
//!
//! Provides:
//! - Real New York City locations (from OpenStreetMap)
//! - Deterministic segment sources for builder scenarios

pub mod new_york_locations;
pub mod sources;

pub use new_york_locations::*;
#[allow(unused_imports)]
pub use sources::*;
