//! Responder kinds carried in the envelope discriminant.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An emergency service that can be dispatched toward a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ResponderKind {
    /// Receiving hospital.
    Hospital,
    /// Police unit.
    Police,
    /// Ambulance / paramedic crew.
    Paramedic,
    /// Fire department engine.
    Fire,
}

impl ResponderKind {
    /// Every responder kind, in dashboard panel order.
    pub const ALL: [Self; 4] = [Self::Hospital, Self::Police, Self::Paramedic, Self::Fire];

    /// The `type` tag used on the wire.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Hospital => "hospital",
            Self::Police => "police",
            Self::Paramedic => "paramedic",
            Self::Fire => "fire",
        }
    }

    /// Human-readable label used in dispatch summaries.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hospital => "Hospital",
            Self::Police => "Police",
            Self::Paramedic => "Paramedic",
            Self::Fire => "Fire Dept",
        }
    }

    /// Look up a kind by its wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Whether markers of this kind travel along a route to the caller.
    ///
    /// The hospital is a destination, not a vehicle, so it is placed
    /// directly.
    pub const fn is_mobile(self) -> bool {
        !matches!(self, Self::Hospital)
    }
}

impl core::fmt::Display for ResponderKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for kind in ResponderKind::ALL {
            assert_eq!(ResponderKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ResponderKind::from_tag("user"), None);
        assert_eq!(ResponderKind::from_tag("Hospital"), None);
    }

    #[test]
    fn only_hospital_is_stationary() {
        assert!(!ResponderKind::Hospital.is_mobile());
        assert!(ResponderKind::Police.is_mobile());
        assert!(ResponderKind::Paramedic.is_mobile());
        assert!(ResponderKind::Fire.is_mobile());
    }
}
