//! Error types.

use thiserror::Error;

/// Failure talking to a routing or elevation backend.
///
/// Never reaches the route builder; the adapter turns it into a fallback.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} rejected the request: {code}")]
    Rejected { provider: &'static str, code: String },
    #[error("empty response")]
    EmptyResponse,
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors returned by route builder operations.
#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    #[error("waypoint index {index} out of range for {len} waypoints")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("cannot truncate to {requested} waypoints, route has {len}")]
    TruncateBeyondLength { requested: usize, len: usize },
    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },
    #[error("another route mutation is in flight")]
    Busy,
    #[error("route state lock poisoned by an earlier panic")]
    Poisoned,
    #[error("route invariant violated: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown {kind} service '{value}'")]
    UnknownService { kind: &'static str, value: String },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
    #[error("{0} must be set for the selected service")]
    Missing(&'static str),
}
