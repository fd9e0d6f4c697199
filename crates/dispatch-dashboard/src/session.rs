//! One dashboard view: the reconciler and the animator driven together.

use dispatch_types::{CallerInfo, ResponderInfo};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::animate::MarkerAnimator;
use crate::canvas::MarkerCanvas;
use crate::reconcile::{DashboardState, Reconciled, SlotUpdate};
use crate::route::RouteProvider;

/// Applies stream payloads to state and turns slot changes into marker
/// updates.
#[derive(Debug)]
pub struct DashboardSession<R, C> {
    state: DashboardState,
    animator: MarkerAnimator<R, C>,
}

impl<R, C> DashboardSession<R, C>
where
    R: RouteProvider,
    C: MarkerCanvas,
{
    /// Start a session with empty state.
    pub fn new(animator: MarkerAnimator<R, C>) -> Self {
        Self {
            state: DashboardState::new(),
            animator,
        }
    }

    /// Apply one raw payload and update markers for the slot it changed.
    pub fn handle(&mut self, raw: &str) -> Reconciled {
        let reconciled = self.state.apply(raw);
        info!(target: "dispatch_dashboard::terminal", "{}", reconciled.summary);

        match reconciled.update {
            SlotUpdate::Responder(kind) => {
                match self.state.responder(kind).and_then(ResponderInfo::coordinate) {
                    Some(at) => self.animator.on_responder(kind, at),
                    None => debug!(%kind, "responder has no position"),
                }
            }
            SlotUpdate::User => match self.state.user().and_then(CallerInfo::coordinate) {
                Some(at) => self.animator.on_caller(at),
                None => debug!("caller has no position"),
            },
            SlotUpdate::None => {}
        }
        reconciled
    }

    /// Handle payloads until the channel closes.
    pub async fn run(&mut self, mut events: mpsc::Receiver<String>) {
        while let Some(raw) = events.recv().await {
            self.handle(&raw);
        }
        info!(events = self.state.events().len(), "event channel closed");
    }

    /// Reconciled state.
    pub const fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Marker animator.
    pub const fn animator(&self) -> &MarkerAnimator<R, C> {
        &self.animator
    }
}
