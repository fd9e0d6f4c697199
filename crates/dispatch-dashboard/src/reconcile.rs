//! Client-side state reconciliation.
//!
//! Keeps the latest snapshot per entity (four responders and the caller)
//! plus two append-only logs: every raw payload received, and one
//! human-readable summary per payload. Malformed input never fails; it
//! degrades to an `Event: <raw>` summary and leaves every slot untouched.

use dispatch_types::{CallerInfo, Envelope, ResponderInfo, ResponderKind};
use tracing::{debug, warn};

/// Placeholder shown in the terminal before any event has arrived.
pub const WAITING_FOR_EVENTS: &str = "Waiting for events";

/// Which state slot an applied event replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotUpdate {
    /// A responder slot.
    Responder(ResponderKind),
    /// The caller slot.
    User,
    /// Nothing was replaced.
    None,
}

/// Outcome of applying one raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The summary line appended to the log.
    pub summary: String,
    /// The slot that changed.
    pub update: SlotUpdate,
}

/// Latest known state of one dispatch incident.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    hospital: Option<ResponderInfo>,
    police: Option<ResponderInfo>,
    paramedic: Option<ResponderInfo>,
    fire: Option<ResponderInfo>,
    user: Option<CallerInfo>,
    events: Vec<String>,
    summaries: Vec<String>,
}

impl DashboardState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one raw payload from the stream.
    ///
    /// The payload is parsed once; the summary and the slot update are
    /// both derived from that single result.
    pub fn apply(&mut self, raw: &str) -> Reconciled {
        self.events.push(raw.to_owned());

        let envelope = match Envelope::parse(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "unparseable event payload");
                let summary = fallback_summary(raw);
                self.summaries.push(summary.clone());
                return Reconciled {
                    summary,
                    update: SlotUpdate::None,
                };
            }
        };

        let summary = summarize(&envelope, raw);
        self.summaries.push(summary.clone());
        let update = self.store(envelope);
        debug!(?update, "event applied");

        Reconciled { summary, update }
    }

    fn store(&mut self, envelope: Envelope) -> SlotUpdate {
        match envelope {
            Envelope::Responder { kind, info } => {
                *self.responder_slot(kind) = Some(info);
                SlotUpdate::Responder(kind)
            }
            Envelope::User(info) => {
                self.user = Some(info);
                SlotUpdate::User
            }
            Envelope::Unknown(_) => SlotUpdate::None,
        }
    }

    fn responder_slot(&mut self, kind: ResponderKind) -> &mut Option<ResponderInfo> {
        match kind {
            ResponderKind::Hospital => &mut self.hospital,
            ResponderKind::Police => &mut self.police,
            ResponderKind::Paramedic => &mut self.paramedic,
            ResponderKind::Fire => &mut self.fire,
        }
    }

    /// Latest snapshot for a responder kind.
    pub const fn responder(&self, kind: ResponderKind) -> Option<&ResponderInfo> {
        match kind {
            ResponderKind::Hospital => self.hospital.as_ref(),
            ResponderKind::Police => self.police.as_ref(),
            ResponderKind::Paramedic => self.paramedic.as_ref(),
            ResponderKind::Fire => self.fire.as_ref(),
        }
    }

    /// Latest caller snapshot.
    pub const fn user(&self) -> Option<&CallerInfo> {
        self.user.as_ref()
    }

    /// Every raw payload received, in arrival order.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// One summary per received payload, in arrival order.
    pub fn summaries(&self) -> &[String] {
        &self.summaries
    }

    /// The terminal panel text: all summaries, one per line.
    pub fn live_terminal(&self) -> String {
        if self.summaries.is_empty() {
            WAITING_FOR_EVENTS.to_owned()
        } else {
            self.summaries.join("\n")
        }
    }
}

/// Human-readable line for a decoded envelope.
///
/// Unknown envelopes echo the raw payload text rather than a
/// re-serialization of it.
pub fn summarize(envelope: &Envelope, raw: &str) -> String {
    match envelope {
        Envelope::Responder { kind, info } => format!(
            "{} dispatched: {} ({})",
            kind.label(),
            info.name.as_deref().unwrap_or_default(),
            info.address.as_deref().unwrap_or_default(),
        ),
        Envelope::User(info) => format!(
            "Caller: {} ({})",
            info.name.as_deref().unwrap_or_default(),
            info.location.as_deref().unwrap_or_default(),
        ),
        Envelope::Unknown(_) => fallback_summary(raw),
    }
}

fn fallback_summary(raw: &str) -> String {
    format!("Event: {raw}")
}
