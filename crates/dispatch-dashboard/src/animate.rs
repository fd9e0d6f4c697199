//! Responder marker animation.
//!
//! Every mobile responder owns one [`MarkerSlot`]. When a responder
//! reports a new position, the slot is torn down and rebuilt as a unit:
//! the running animation task is aborted, its route overlay cleared, the
//! marker re-placed at its last rendered position, and a new task spawned
//! that fetches a route to the caller and steps the marker along it.
//!
//! ```text
//! Idle --new coordinate--> RouteFetchPending --route--> Animating --last point--> Idle
//!                               ^                            |
//!                               +------ new coordinate ------+
//! ```
//!
//! The animator is driven from a single task; animation tasks only touch
//! the canvas and their own progress channel, so at most one animation
//! per responder is ever live.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use dispatch_types::{Coordinate, ResponderKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::canvas::{MarkerCanvas, MarkerKind};
use crate::route::RouteProvider;

/// Where a responder marker is in its animation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerPhase {
    /// Not moving.
    #[default]
    Idle,
    /// Waiting for the route provider.
    RouteFetchPending,
    /// Stepping along a route.
    Animating,
}

/// Latest rendered state of one marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerProgress {
    /// Position the marker was last drawn at.
    pub position: Coordinate,
    /// Current lifecycle phase.
    pub phase: MarkerPhase,
}

/// Per-responder animation state, replaced as one unit on restart.
#[derive(Debug)]
pub struct MarkerSlot {
    reported: Coordinate,
    progress: Option<watch::Receiver<MarkerProgress>>,
    target: Option<Coordinate>,
    task: Option<JoinHandle<()>>,
}

impl MarkerSlot {
    const fn new(reported: Coordinate) -> Self {
        Self {
            reported,
            progress: None,
            target: None,
            task: None,
        }
    }

    /// The position last reported by the producer.
    pub const fn reported(&self) -> Coordinate {
        self.reported
    }

    /// The caller position the current route heads toward.
    pub const fn target(&self) -> Option<Coordinate> {
        self.target
    }

    /// Rendered state, or `None` if the marker was never placed.
    pub fn progress(&self) -> Option<MarkerProgress> {
        self.progress.as_ref().map(|rx| *rx.borrow())
    }

    /// A receiver that observes this marker's progress.
    ///
    /// The receiver closes when the animation it belongs to ends or is
    /// replaced.
    pub fn watch(&self) -> Option<watch::Receiver<MarkerProgress>> {
        self.progress.clone()
    }

    fn rendered_position(&self) -> Option<Coordinate> {
        self.progress().map(|p| p.position)
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Drives map markers from reconciled state changes.
pub struct MarkerAnimator<R, C> {
    routes: Arc<R>,
    canvas: Arc<C>,
    step: Duration,
    caller: Option<Coordinate>,
    hospital: Option<Coordinate>,
    slots: BTreeMap<ResponderKind, MarkerSlot>,
}

impl<R, C> MarkerAnimator<R, C>
where
    R: RouteProvider,
    C: MarkerCanvas,
{
    /// Create an animator stepping markers every `step`.
    pub const fn new(routes: Arc<R>, canvas: Arc<C>, step: Duration) -> Self {
        Self {
            routes,
            canvas,
            step,
            caller: None,
            hospital: None,
            slots: BTreeMap::new(),
        }
    }

    /// Handle a responder reporting its position.
    ///
    /// The hospital is repositioned directly. Mobile responders restart
    /// their animation only if the reported position changed; a repeat of
    /// the last report leaves any in-flight animation untouched.
    pub fn on_responder(&mut self, kind: ResponderKind, at: Coordinate) {
        if !kind.is_mobile() {
            self.reposition(MarkerKind::Responder(kind), at);
            self.hospital = Some(at);
            return;
        }

        match self.slots.get_mut(&kind) {
            Some(slot) if slot.reported.same_position(at) => {
                debug!(%kind, "position unchanged, animation kept");
                return;
            }
            Some(slot) => slot.reported = at,
            None => {
                self.slots.insert(kind, MarkerSlot::new(at));
            }
        }

        if self.caller.is_some() {
            self.restart(kind);
        } else {
            debug!(%kind, "no caller position yet, route deferred");
        }
    }

    /// Handle the caller reporting a position.
    ///
    /// The caller marker is repositioned directly. Responders whose route
    /// does not already lead to this position are re-routed.
    pub fn on_caller(&mut self, at: Coordinate) {
        self.reposition(MarkerKind::Caller, at);
        if self.caller.is_some_and(|caller| caller.same_position(at)) {
            return;
        }
        self.caller = Some(at);

        let stale: Vec<ResponderKind> = self
            .slots
            .iter()
            .filter(|(_, slot)| !slot.target.is_some_and(|target| target.same_position(at)))
            .map(|(kind, _)| *kind)
            .collect();
        for kind in stale {
            self.restart(kind);
        }
    }

    /// Last known caller position.
    pub const fn caller(&self) -> Option<Coordinate> {
        self.caller
    }

    /// Last known hospital position.
    pub const fn hospital(&self) -> Option<Coordinate> {
        self.hospital
    }

    /// The slot for a mobile responder, if it has reported.
    pub fn slot(&self, kind: ResponderKind) -> Option<&MarkerSlot> {
        self.slots.get(&kind)
    }

    /// Current phase of a responder marker. Unplaced markers are idle.
    pub fn phase(&self, kind: ResponderKind) -> MarkerPhase {
        self.slot(kind)
            .and_then(MarkerSlot::progress)
            .map_or(MarkerPhase::Idle, |p| p.phase)
    }

    /// Position a responder marker was last drawn at.
    pub fn position(&self, kind: ResponderKind) -> Option<Coordinate> {
        self.slot(kind).and_then(MarkerSlot::rendered_position)
    }

    fn reposition(&self, marker: MarkerKind, at: Coordinate) {
        self.canvas.remove_marker(marker);
        self.canvas.place_marker(marker, at);
    }

    /// Tear down and rebuild one responder's animation toward the caller.
    fn restart(&mut self, kind: ResponderKind) {
        let Some(caller) = self.caller else {
            return;
        };
        let Some(slot) = self.slots.get_mut(&kind) else {
            return;
        };
        let marker = MarkerKind::Responder(kind);

        slot.abort();
        self.canvas.clear_route(marker);
        let start = match slot.rendered_position() {
            Some(position) => {
                self.canvas.remove_marker(marker);
                position
            }
            None => slot.reported,
        };
        self.canvas.place_marker(marker, start);

        let (tx, rx) = watch::channel(MarkerProgress {
            position: start,
            phase: MarkerPhase::RouteFetchPending,
        });
        let task = tokio::spawn(animate(
            Arc::clone(&self.routes),
            Arc::clone(&self.canvas),
            self.step,
            Leg {
                marker,
                from: start,
                to: caller,
            },
            tx,
        ));

        *slot = MarkerSlot {
            reported: slot.reported,
            progress: Some(rx),
            target: Some(caller),
            task: Some(task),
        };
        info!(%kind, from = %start, to = %caller, "routing responder to caller");
    }
}

impl<R, C> Drop for MarkerAnimator<R, C> {
    fn drop(&mut self) {
        for slot in self.slots.values_mut() {
            slot.abort();
        }
    }
}

impl<R, C> core::fmt::Debug for MarkerAnimator<R, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MarkerAnimator")
            .field("step", &self.step)
            .field("caller", &self.caller)
            .field("hospital", &self.hospital)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// One route request.
#[derive(Debug, Clone, Copy)]
struct Leg {
    marker: MarkerKind,
    from: Coordinate,
    to: Coordinate,
}

/// Fetch a route and step the marker along it.
async fn animate<R, C>(
    routes: Arc<R>,
    canvas: Arc<C>,
    step: Duration,
    leg: Leg,
    progress: watch::Sender<MarkerProgress>,
) where
    R: RouteProvider,
    C: MarkerCanvas,
{
    let Leg { marker, from, to } = leg;
    let idle_at = |position| MarkerProgress {
        position,
        phase: MarkerPhase::Idle,
    };

    let path = match routes.fetch_route(from, to).await {
        Ok(path) if !path.is_empty() => path,
        Ok(_) => {
            warn!(%marker, "route has no points, marker stays put");
            progress.send_replace(idle_at(from));
            return;
        }
        Err(e) => {
            warn!(%marker, error = %e, "route fetch failed, marker stays put");
            progress.send_replace(idle_at(from));
            return;
        }
    };

    canvas.draw_route(marker, &path);
    progress.send_replace(MarkerProgress {
        position: from,
        phase: MarkerPhase::Animating,
    });

    // The first point is the start position unless it is the only one.
    let points = path.points();
    let steps = points.get(1..).filter(|rest| !rest.is_empty()).unwrap_or(points);

    let mut position = from;
    for point in steps {
        tokio::time::sleep(step).await;
        position = *point;
        canvas.move_marker(marker, position);
        progress.send_replace(MarkerProgress {
            position,
            phase: MarkerPhase::Animating,
        });
    }

    progress.send_replace(idle_at(position));
    debug!(%marker, points = path.len(), "animation finished");
}
