//! Shared, serialized access to a [`RouteBuilder`].
//!
//! At most one mutation runs at a time. `try_append_waypoint` rejects a
//! click that arrives while another mutation is in flight or queued. Every
//! other mutation takes a ticket and runs strictly in arrival order once
//! the ones ahead of it have finished.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::builder::RouteBuilder;
use crate::error::RouteError;
use crate::polyline::Coord;
use crate::snapshot::RouteSnapshot;
use crate::traits::SegmentSource;

struct Shared<S> {
    builder: Mutex<RouteBuilder<S>>,
    tickets: Mutex<Tickets>,
    turn: Condvar,
}

/// `serving` is the ticket allowed to mutate; `next` is handed to the next caller.
#[derive(Default)]
struct Tickets {
    next: u64,
    serving: u64,
}

/// Held for the duration of one mutation. Dropping it admits the next ticket,
/// also when the mutation fails or panics.
struct Turn<'a> {
    tickets: &'a Mutex<Tickets>,
    turn: &'a Condvar,
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        let mut tickets = self.tickets.lock().unwrap_or_else(PoisonError::into_inner);
        tickets.serving += 1;
        self.turn.notify_all();
    }
}

pub struct RouteSession<S> {
    inner: Arc<Shared<S>>,
}

impl<S> Clone for RouteSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SegmentSource> RouteSession<S> {
    pub fn new(builder: RouteBuilder<S>) -> Self {
        Self {
            inner: Arc::new(Shared {
                builder: Mutex::new(builder),
                tickets: Mutex::new(Tickets::default()),
                turn: Condvar::new(),
            }),
        }
    }

    /// Appends unless another mutation is in flight or queued, in which case
    /// the request is dropped with [`RouteError::Busy`].
    pub fn try_append_waypoint(
        &self,
        point: Coord,
        elevation: Option<f64>,
    ) -> Result<RouteSnapshot, RouteError> {
        let _turn = {
            let mut tickets = self.tickets();
            if tickets.serving != tickets.next {
                tracing::debug!(
                    lat = point.lat,
                    lng = point.lng,
                    pending = tickets.next - tickets.serving,
                    "append rejected while busy"
                );
                return Err(RouteError::Busy);
            }
            tickets.next += 1;
            self.turn_guard()
        };
        self.lock()?.append_waypoint(point, elevation)
    }

    /// Appends after every mutation queued before it has completed.
    pub fn append_waypoint(
        &self,
        point: Coord,
        elevation: Option<f64>,
    ) -> Result<RouteSnapshot, RouteError> {
        self.queued(|builder| builder.append_waypoint(point, elevation))
    }

    pub fn move_waypoint(
        &self,
        index: usize,
        point: Coord,
        elevation: Option<f64>,
    ) -> Result<RouteSnapshot, RouteError> {
        self.queued(|builder| builder.move_waypoint(index, point, elevation))
    }

    pub fn truncate(&self, new_len: usize) -> Result<RouteSnapshot, RouteError> {
        self.queued(|builder| builder.truncate(new_len))
    }

    pub fn undo(&self) -> Result<RouteSnapshot, RouteError> {
        self.queued(|builder| builder.undo())
    }

    pub fn clear(&self) -> Result<RouteSnapshot, RouteError> {
        self.queued(|builder| builder.clear())
    }

    pub fn rebuild(&self) -> Result<RouteSnapshot, RouteError> {
        self.queued(|builder| builder.rebuild())
    }

    /// Current state. Waits for an in-flight mutation but not for queued ones.
    pub fn snapshot(&self) -> Result<RouteSnapshot, RouteError> {
        Ok(self.lock()?.snapshot())
    }

    pub fn subscribe<F>(&self, observer: F) -> Result<(), RouteError>
    where
        F: FnMut(&RouteSnapshot) + Send + 'static,
    {
        self.lock()?.subscribe(observer);
        Ok(())
    }

    /// Mutations in flight plus those waiting for their turn.
    pub fn pending_operations(&self) -> usize {
        let tickets = self.tickets();
        (tickets.next - tickets.serving) as usize
    }

    fn queued<T>(
        &self,
        operation: impl FnOnce(&mut RouteBuilder<S>) -> Result<T, RouteError>,
    ) -> Result<T, RouteError> {
        let _turn = self.wait_turn();
        let mut builder = self.lock()?;
        operation(&mut builder)
    }

    fn wait_turn(&self) -> Turn<'_> {
        let mut tickets = self.tickets();
        let ticket = tickets.next;
        tickets.next += 1;
        let _admitted = self
            .inner
            .turn
            .wait_while(tickets, |tickets| tickets.serving != ticket)
            .unwrap_or_else(PoisonError::into_inner);
        self.turn_guard()
    }

    fn turn_guard(&self) -> Turn<'_> {
        Turn {
            tickets: &self.inner.tickets,
            turn: &self.inner.turn,
        }
    }

    // Ticket counters are only ever incremented, so a poisoned lock still
    // holds consistent values.
    fn tickets(&self) -> MutexGuard<'_, Tickets> {
        self.inner
            .tickets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> Result<MutexGuard<'_, RouteBuilder<S>>, RouteError> {
        self.inner.builder.lock().map_err(|_| RouteError::Poisoned)
    }
}
