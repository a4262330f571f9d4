//! Incremental route builder.
//!
//! Owns the waypoint list `W`, the stitched polyline `V`, the per-vertex
//! elevations `E` and the per-segment vertex counts `S`. After every
//! completed operation:
//!
//! - `E.len() == V.len()`
//! - `S.iter().map(|s| s.vertex_count).sum() == V.len()`
//! - `S.len() == W.len().saturating_sub(1)`
//!
//! The first segment contributes all of its vertices; each later segment
//! drops its first vertex, which is the joint already at the tail of `V`.
//! Truncation pops descriptors and drops exactly their vertex counts.

use rayon::prelude::*;

use crate::adapter::ProviderAdapter;
use crate::config::PlannerConfig;
use crate::error::RouteError;
use crate::haversine::path_length_meters;
use crate::polyline::Coord;
use crate::snapshot::{RouteSnapshot, RoutedSegment, SegmentDescriptor, Waypoint};
use crate::traits::SegmentSource;

type Observer = Box<dyn FnMut(&RouteSnapshot) + Send>;

pub struct RouteBuilder<S> {
    source: S,
    parallel_rebuild: bool,
    waypoints: Vec<Waypoint>,
    vertices: Vec<Coord>,
    elevations: Vec<f64>,
    segments: Vec<SegmentDescriptor>,
    observers: Vec<Observer>,
}

impl RouteBuilder<ProviderAdapter> {
    /// Builder over the backends named in `config`, honouring its
    /// `parallel_rebuild` setting.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, reqwest::Error> {
        let adapter = ProviderAdapter::from_config(config)?;
        Ok(Self::new(adapter).with_parallel_rebuild(config.parallel_rebuild))
    }
}

impl<S: SegmentSource> RouteBuilder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            parallel_rebuild: false,
            waypoints: Vec::new(),
            vertices: Vec::new(),
            elevations: Vec::new(),
            segments: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Fetch segments concurrently in [`rebuild`](Self::rebuild). They are
    /// still stitched in waypoint order.
    pub fn with_parallel_rebuild(mut self, enabled: bool) -> Self {
        self.parallel_rebuild = enabled;
        self
    }

    pub fn parallel_rebuild(&self) -> bool {
        self.parallel_rebuild
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn vertices(&self) -> &[Coord] {
        &self.vertices
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    pub fn segments(&self) -> &[SegmentDescriptor] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Registers a callback run with the new snapshot after every mutation.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&RouteSnapshot) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn snapshot(&self) -> RouteSnapshot {
        RouteSnapshot {
            waypoints: self.waypoints.clone(),
            route_vertices: self.vertices.clone(),
            elevation_samples: self.elevations.clone(),
            segments: self.segments.clone(),
            total_distance_meters: path_length_meters(&self.vertices),
        }
    }

    /// Adds a waypoint at the end of the route and routes the new segment.
    ///
    /// A missing elevation is looked up through the segment source.
    pub fn append_waypoint(
        &mut self,
        point: Coord,
        elevation: Option<f64>,
    ) -> Result<RouteSnapshot, RouteError> {
        validate_coord(point)?;

        let segment = match self.waypoints.last() {
            Some(last) => {
                let segment = self.source.route_between(last.coord(), point);
                validate_segment(&segment)?;
                Some(segment)
            }
            None => None,
        };

        let elevation = elevation.unwrap_or_else(|| self.source.elevation_at(point));
        if let Some(segment) = segment {
            self.push_segment(segment);
        }
        self.waypoints.push(Waypoint::new(point, Some(elevation)));

        tracing::info!(
            waypoints = self.waypoints.len(),
            vertices = self.vertices.len(),
            "waypoint appended"
        );
        Ok(self.finish())
    }

    /// Moves the waypoint at `index` and re-routes the segments touching it.
    ///
    /// Only the one or two adjacent segments are fetched again; the result
    /// equals a fresh build over the updated waypoints.
    pub fn move_waypoint(
        &mut self,
        index: usize,
        point: Coord,
        elevation: Option<f64>,
    ) -> Result<RouteSnapshot, RouteError> {
        let len = self.waypoints.len();
        if index >= len {
            return Err(RouteError::IndexOutOfRange { index, len });
        }
        validate_coord(point)?;

        if len == 1 {
            let elevation = elevation.unwrap_or_else(|| self.source.elevation_at(point));
            self.waypoints[index] = Waypoint::new(point, Some(elevation));
            return Ok(self.finish());
        }

        // Segment `i` joins waypoints `i` and `i + 1`.
        let first = index.saturating_sub(1);
        let last = index.min(len - 2);

        let mut moved = self.waypoints[first..=last + 1].to_vec();
        moved[index - first] = Waypoint::new(point, elevation);
        let fetched = moved
            .windows(2)
            .map(|pair| self.source.route_between(pair[0].coord(), pair[1].coord()))
            .collect::<Vec<_>>();
        for segment in &fetched {
            validate_segment(segment)?;
        }

        let start = self.vertex_offset(first);
        let end = self.vertex_offset(last + 1);

        let mut vertices = Vec::new();
        let mut elevations = Vec::new();
        let mut descriptors = Vec::with_capacity(fetched.len());
        for (offset, segment) in fetched.into_iter().enumerate() {
            let skip = usize::from(first + offset > 0);
            let (segment_vertices, segment_elevations) = segment.path.into_parts();
            descriptors.push(SegmentDescriptor {
                vertex_count: segment_vertices.len() - skip,
                origin: segment.origin,
            });
            vertices.extend(segment_vertices.into_iter().skip(skip));
            elevations.extend(segment_elevations.into_iter().skip(skip));
        }

        let elevation = elevation.unwrap_or_else(|| self.source.elevation_at(point));
        self.vertices.splice(start..end, vertices);
        self.elevations.splice(start..end, elevations);
        self.segments.splice(first..=last, descriptors);
        self.waypoints[index] = Waypoint::new(point, Some(elevation));

        tracing::info!(
            index,
            segments = last + 1 - first,
            vertices = self.vertices.len(),
            "waypoint moved"
        );
        Ok(self.finish())
    }

    /// Drops trailing waypoints until `new_len` remain.
    pub fn truncate(&mut self, new_len: usize) -> Result<RouteSnapshot, RouteError> {
        let len = self.waypoints.len();
        if new_len > len {
            return Err(RouteError::TruncateBeyondLength {
                requested: new_len,
                len,
            });
        }

        for _ in new_len..len {
            if let Some(segment) = self.segments.pop() {
                let keep = self.vertices.len() - segment.vertex_count;
                self.vertices.truncate(keep);
                self.elevations.truncate(keep);
            }
            self.waypoints.pop();
        }

        if len != new_len {
            tracing::info!(
                removed = len - new_len,
                waypoints = new_len,
                "route truncated"
            );
        }
        Ok(self.finish())
    }

    /// Removes the last waypoint, if any.
    pub fn undo(&mut self) -> Result<RouteSnapshot, RouteError> {
        self.truncate(self.waypoints.len().saturating_sub(1))
    }

    pub fn clear(&mut self) -> Result<RouteSnapshot, RouteError> {
        self.truncate(0)
    }

    /// Re-fetches every segment and stitches the route from scratch.
    pub fn rebuild(&mut self) -> Result<RouteSnapshot, RouteError> {
        let fetched = if self.parallel_rebuild {
            let source = &self.source;
            self.waypoints
                .par_windows(2)
                .map(|pair| source.route_between(pair[0].coord(), pair[1].coord()))
                .collect::<Vec<_>>()
        } else {
            self.waypoints
                .windows(2)
                .map(|pair| self.source.route_between(pair[0].coord(), pair[1].coord()))
                .collect::<Vec<_>>()
        };
        for segment in &fetched {
            validate_segment(segment)?;
        }

        self.vertices.clear();
        self.elevations.clear();
        self.segments.clear();
        for segment in fetched {
            self.push_segment(segment);
        }

        tracing::info!(
            waypoints = self.waypoints.len(),
            vertices = self.vertices.len(),
            parallel = self.parallel_rebuild,
            "route rebuilt"
        );
        Ok(self.finish())
    }

    /// Verifies the bookkeeping invariants.
    pub fn check_invariants(&self) -> Result<(), RouteError> {
        if self.elevations.len() != self.vertices.len() {
            return Err(RouteError::InvariantViolation(format!(
                "{} elevation samples for {} vertices",
                self.elevations.len(),
                self.vertices.len()
            )));
        }
        let counted: usize = self.segments.iter().map(|s| s.vertex_count).sum();
        if counted != self.vertices.len() {
            return Err(RouteError::InvariantViolation(format!(
                "segments account for {} vertices, polyline has {}",
                counted,
                self.vertices.len()
            )));
        }
        let expected = self.waypoints.len().saturating_sub(1);
        if self.segments.len() != expected {
            return Err(RouteError::InvariantViolation(format!(
                "{} segments for {} waypoints",
                self.segments.len(),
                self.waypoints.len()
            )));
        }
        Ok(())
    }

    fn push_segment(&mut self, segment: RoutedSegment) {
        let skip = usize::from(!self.vertices.is_empty());
        let (vertices, elevations) = segment.path.into_parts();
        self.segments.push(SegmentDescriptor {
            vertex_count: vertices.len() - skip,
            origin: segment.origin,
        });
        self.vertices.extend(vertices.into_iter().skip(skip));
        self.elevations.extend(elevations.into_iter().skip(skip));
    }

    /// Index in `V` of the first vertex owned by segment `segment`.
    fn vertex_offset(&self, segment: usize) -> usize {
        self.segments[..segment].iter().map(|s| s.vertex_count).sum()
    }

    fn finish(&mut self) -> RouteSnapshot {
        debug_assert!(
            self.check_invariants().is_ok(),
            "{:?}",
            self.check_invariants()
        );
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer(&snapshot);
        }
        snapshot
    }
}

fn validate_coord(point: Coord) -> Result<(), RouteError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(RouteError::InvalidCoordinate {
            lat: point.lat,
            lng: point.lng,
        })
    }
}

fn validate_segment(segment: &RoutedSegment) -> Result<(), RouteError> {
    if segment.path.len() < 2 {
        return Err(RouteError::InvariantViolation(format!(
            "segment with {} vertices",
            segment.path.len()
        )));
    }
    Ok(())
}
