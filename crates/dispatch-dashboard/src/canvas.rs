//! Rendering surface for map markers and route overlays.

use dispatch_types::{Coordinate, ResponderKind};
use tracing::info;

use crate::route::RoutePath;

/// A marker drawn on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerKind {
    /// A responder or the hospital.
    Responder(ResponderKind),
    /// The caller.
    Caller,
}

impl MarkerKind {
    /// Marker colour.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Responder(ResponderKind::Hospital) => "green",
            Self::Responder(ResponderKind::Police) => "indigo",
            Self::Responder(ResponderKind::Paramedic) => "red",
            Self::Responder(ResponderKind::Fire) => "orange",
            Self::Caller => "blue",
        }
    }
}

impl core::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Responder(kind) => f.write_str(kind.tag()),
            Self::Caller => f.write_str("user"),
        }
    }
}

/// Operations the animator performs on the map.
///
/// Each marker kind has at most one marker and one route overlay.
pub trait MarkerCanvas: Send + Sync + 'static {
    /// Create the marker at `at`.
    fn place_marker(&self, marker: MarkerKind, at: Coordinate);
    /// Move an existing marker to `to`.
    fn move_marker(&self, marker: MarkerKind, to: Coordinate);
    /// Remove the marker if present.
    fn remove_marker(&self, marker: MarkerKind);
    /// Draw the route overlay for a marker, replacing any previous one.
    fn draw_route(&self, marker: MarkerKind, route: &RoutePath);
    /// Remove the route overlay if present.
    fn clear_route(&self, marker: MarkerKind);
}

/// Headless canvas that logs each operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCanvas;

impl MarkerCanvas for TracingCanvas {
    fn place_marker(&self, marker: MarkerKind, at: Coordinate) {
        info!(%marker, color = marker.color(), lat = at.lat, lon = at.lon, "marker placed");
    }

    fn move_marker(&self, marker: MarkerKind, to: Coordinate) {
        info!(%marker, lat = to.lat, lon = to.lon, "marker moved");
    }

    fn remove_marker(&self, marker: MarkerKind) {
        info!(%marker, "marker removed");
    }

    fn draw_route(&self, marker: MarkerKind, route: &RoutePath) {
        let route_id = format!("{marker}-route");
        info!(%marker, %route_id, points = route.len(), "route drawn");
    }

    fn clear_route(&self, marker: MarkerKind) {
        info!(%marker, "route cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_names_match_wire_tags() {
        assert_eq!(MarkerKind::Responder(ResponderKind::Fire).to_string(), "fire");
        assert_eq!(MarkerKind::Caller.to_string(), "user");
    }

    #[test]
    fn every_marker_has_a_distinct_color() {
        let mut colors: Vec<&str> = ResponderKind::ALL
            .into_iter()
            .map(|kind| MarkerKind::Responder(kind).color())
            .chain(std::iter::once(MarkerKind::Caller.color()))
            .collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), 5);
    }
}
