//! Route providers for responder markers.
//!
//! A route is an ordered list of coordinates from a responder's current
//! position to the caller. Two backends exist: a driving-directions HTTP
//! API returning a GeoJSON line, and a straight-line interpolation used
//! when no directions access token is configured.

use std::future::Future;
use std::time::Duration;

use dispatch_types::Coordinate;
use serde::Deserialize;

use crate::config::{DashboardConfig, DirectionsConfig};

/// Timeout for a single directions request.
const DIRECTIONS_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from fetching a route.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The request could not be sent or the body could not be read.
    #[error("directions request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The directions service answered with a non-success status.
    #[error("directions service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not the expected shape.
    #[error("malformed directions response: {0}")]
    Malformed(String),

    /// The service found no route between the two points.
    #[error("no route between {from} and {to}")]
    NoRoute {
        /// Start position.
        from: Coordinate,
        /// End position.
        to: Coordinate,
    },
}

/// An ordered path of coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoutePath {
    points: Vec<Coordinate>,
}

impl RoutePath {
    /// Wrap a list of points.
    pub const fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// All points in travel order.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The final point, if any.
    pub fn destination(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }
}

/// Something that can compute a route between two positions.
pub trait RouteProvider: Send + Sync + 'static {
    /// Fetch a route from `from` to `to`.
    fn fetch_route(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> impl Future<Output = Result<RoutePath, RouteError>> + Send;
}

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// The route backend selected at startup.
#[derive(Debug)]
pub enum RouteBackend {
    /// Driving directions over HTTP.
    Directions(DirectionsBackend),
    /// Straight-line interpolation.
    StraightLine(StraightLine),
}

impl RouteBackend {
    /// Pick a backend from configuration.
    ///
    /// Directions are used when an access token is configured, straight
    /// lines otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, RouteError> {
        match &config.directions {
            Some(directions) => Ok(Self::Directions(DirectionsBackend::new(directions)?)),
            None => Ok(Self::StraightLine(StraightLine::new(config.straight_line_steps))),
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Directions(_) => "directions",
            Self::StraightLine(_) => "straight-line",
        }
    }
}

impl RouteProvider for RouteBackend {
    async fn fetch_route(&self, from: Coordinate, to: Coordinate) -> Result<RoutePath, RouteError> {
        match self {
            Self::Directions(backend) => backend.fetch_route(from, to).await,
            Self::StraightLine(backend) => Ok(backend.route(from, to)),
        }
    }
}

// ---------------------------------------------------------------------------
// Directions backend
// ---------------------------------------------------------------------------

/// Backend for a Mapbox-style driving directions API.
///
/// Requests `{api_url}/{lon},{lat};{lon},{lat}` with a full-overview
/// GeoJSON geometry and reads the first route's line.
#[derive(Debug)]
pub struct DirectionsBackend {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
}

impl DirectionsBackend {
    /// Create a directions backend.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &DirectionsConfig) -> Result<Self, RouteError> {
        let client = reqwest::Client::builder().timeout(DIRECTIONS_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            access_token: config.access_token.clone(),
        })
    }

    /// Request URL for a route, without the query string.
    pub fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!("{}/{from};{to}", self.api_url)
    }

    async fn fetch_route(&self, from: Coordinate, to: Coordinate) -> Result<RoutePath, RouteError> {
        let response = self
            .client
            .get(self.route_url(from, to))
            .query(&[
                ("geometries", "geojson"),
                ("overview", "full"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(RouteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_directions(&body, from, to)
    }
}

#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    geometry: LineString,
}

#[derive(Deserialize)]
struct LineString {
    coordinates: Vec<Coordinate>,
}

/// Extract the first route's geometry from a directions response body.
fn parse_directions(body: &str, from: Coordinate, to: Coordinate) -> Result<RoutePath, RouteError> {
    let response: DirectionsResponse =
        serde_json::from_str(body).map_err(|e| RouteError::Malformed(e.to_string()))?;
    response
        .routes
        .into_iter()
        .next()
        .map(|route| RoutePath::new(route.geometry.coordinates))
        .ok_or(RouteError::NoRoute { from, to })
}

// ---------------------------------------------------------------------------
// Straight-line backend
// ---------------------------------------------------------------------------

/// Interpolates a straight line in a fixed number of steps.
#[derive(Debug, Clone, Copy)]
pub struct StraightLine {
    steps: u32,
}

impl StraightLine {
    /// Create an interpolator producing `steps + 1` points. Zero is
    /// treated as one step.
    pub fn new(steps: u32) -> Self {
        Self {
            steps: steps.max(1),
        }
    }

    /// The interpolated path, including both endpoints.
    pub fn route(&self, from: Coordinate, to: Coordinate) -> RoutePath {
        let total = f64::from(self.steps);
        let points = (0..=self.steps)
            .map(|i| from.lerp(to, f64::from(i) / total))
            .collect();
        RoutePath::new(points)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_includes_endpoints() {
        let from = Coordinate::new(0.0, 0.0);
        let to = Coordinate::new(4.0, 8.0);
        let path = StraightLine::new(4).route(from, to);
        assert_eq!(path.len(), 5);
        assert_eq!(path.points().first().copied(), Some(from));
        assert_eq!(path.destination(), Some(to));
        assert_eq!(path.points().get(2).copied(), Some(Coordinate::new(2.0, 4.0)));
    }

    #[test]
    fn zero_steps_still_reaches_destination() {
        let path = StraightLine::new(0).route(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn parses_geojson_geometry() {
        let body = r#"{"code":"Ok","routes":[{"distance":10.0,
            "geometry":{"type":"LineString","coordinates":[[-74.2,40.1],[-74.1,40.05],[-74.0,40.0]]}}]}"#;
        let from = Coordinate::new(40.1, -74.2);
        let to = Coordinate::new(40.0, -74.0);
        let path = parse_directions(body, from, to).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.destination(), Some(to));
    }

    #[test]
    fn empty_route_list_is_no_route() {
        let origin = Coordinate::new(0.0, 0.0);
        let err = parse_directions(r#"{"code":"NoRoute","routes":[]}"#, origin, origin).unwrap_err();
        assert!(matches!(err, RouteError::NoRoute { .. }));
    }

    #[test]
    fn garbage_body_is_malformed() {
        let origin = Coordinate::new(0.0, 0.0);
        let err = parse_directions("<html>", origin, origin).unwrap_err();
        assert!(matches!(err, RouteError::Malformed(_)));
    }

    #[test]
    fn route_url_orders_lon_lat() {
        let backend = DirectionsBackend::new(&DirectionsConfig {
            api_url: "https://api.example.test/directions/v5/driving/".to_owned(),
            access_token: "tok".to_owned(),
        })
        .unwrap();
        let url = backend.route_url(Coordinate::new(40.1, -74.2), Coordinate::new(40.0, -74.0));
        assert_eq!(url, "https://api.example.test/directions/v5/driving/-74.2,40.1;-74,40");
    }

    #[tokio::test]
    async fn backend_dispatches_to_straight_line() {
        let backend = RouteBackend::StraightLine(StraightLine::new(2));
        let path = backend
            .fetch_route(Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 2.0))
            .await
            .unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(backend.name(), "straight-line");
    }
}
