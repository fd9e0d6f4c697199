//! Geographic coordinates.

use serde::{Deserialize, Serialize};

/// A WGS84 position.
///
/// Serialized as a `[lon, lat]` pair, the order used by GeoJSON and by
/// routing services.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether two coordinates denote exactly the same reported position.
    ///
    /// Compares bit patterns so a re-delivered envelope is recognised as
    /// a duplicate without tolerance guessing.
    pub fn same_position(self, other: Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lon.to_bits() == other.lon.to_bits()
    }

    /// Linear interpolation between `self` (at `t = 0`) and `to` (at `t = 1`).
    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (to.lat - self.lat) * t,
            lon: self.lon + (to.lon - self.lon) * t,
        }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn geojson_order_is_lon_lat() {
        let c: Coordinate = serde_json::from_str("[-74.2, 40.1]").unwrap();
        assert_eq!(c.lat, 40.1);
        assert_eq!(c.lon, -74.2);
        assert_eq!(serde_json::to_string(&c).unwrap(), "[-74.2,40.1]");
    }

    #[test]
    fn same_position_is_exact() {
        let a = Coordinate::new(1.0, 1.0);
        assert!(a.same_position(Coordinate::new(1.0, 1.0)));
        assert!(!a.same_position(Coordinate::new(1.0, 1.000_001)));
    }

    #[test]
    fn lerp_hits_endpoints_and_midpoint() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(10.0, -20.0);
        assert!(a.lerp(b, 0.0).same_position(a));
        assert!(a.lerp(b, 1.0).same_position(b));
        let mid = a.lerp(b, 0.5);
        assert_eq!(mid.lat, 5.0);
        assert_eq!(mid.lon, -10.0);
    }
}
