//! Dashboard configuration loaded from environment variables.
//!
//! - `RELAY_EVENTS_URL` -- relay stream endpoint (default `http://localhost:3000/events`)
//! - `MAPBOX_ACCESS_TOKEN` -- enables driving directions when set
//! - `DIRECTIONS_API_URL` -- directions base URL (default Mapbox driving profile)
//! - `ANIMATION_STEP_MS` -- delay between marker steps (default `500`)
//! - `STRAIGHT_LINE_STEPS` -- interpolation steps without directions (default `20`)
//! - `RECONNECT_DELAY_MS` -- wait before reconnecting to the relay (default `3000`)

use std::str::FromStr;
use std::time::Duration;

use crate::error::DashboardError;

/// Default relay stream endpoint.
pub const DEFAULT_EVENTS_URL: &str = "http://localhost:3000/events";

/// Default driving directions endpoint.
pub const DEFAULT_DIRECTIONS_API_URL: &str = "https://api.mapbox.com/directions/v5/mapbox/driving";

/// Directions API settings, present only when an access token is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionsConfig {
    /// Base URL; coordinates are appended as a path segment.
    pub api_url: String,
    /// Access token sent as a query parameter.
    pub access_token: String,
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Relay `GET /events` URL.
    pub events_url: String,
    /// Directions settings; `None` selects straight-line routes.
    pub directions: Option<DirectionsConfig>,
    /// Delay between consecutive marker positions.
    pub animation_step: Duration,
    /// Steps used by the straight-line route backend.
    pub straight_line_steps: u32,
    /// Delay before reconnecting after the stream drops.
    pub reconnect_delay: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            events_url: DEFAULT_EVENTS_URL.to_owned(),
            directions: None,
            animation_step: Duration::from_millis(500),
            straight_line_steps: 20,
            reconnect_delay: Duration::from_millis(3000),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] if a value is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let events_url = lookup("RELAY_EVENTS_URL").unwrap_or(defaults.events_url);

        let directions = lookup("MAPBOX_ACCESS_TOKEN")
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty())
            .map(|access_token| DirectionsConfig {
                api_url: lookup("DIRECTIONS_API_URL")
                    .unwrap_or_else(|| DEFAULT_DIRECTIONS_API_URL.to_owned()),
                access_token,
            });

        let animation_step = parse_var::<u64, _>(&lookup, "ANIMATION_STEP_MS")?
            .map_or(defaults.animation_step, Duration::from_millis);
        if animation_step.is_zero() {
            return Err(DashboardError::Config(
                "ANIMATION_STEP_MS must be at least 1".to_owned(),
            ));
        }

        let straight_line_steps =
            parse_var(&lookup, "STRAIGHT_LINE_STEPS")?.unwrap_or(defaults.straight_line_steps);

        let reconnect_delay = parse_var::<u64, _>(&lookup, "RECONNECT_DELAY_MS")?
            .map_or(defaults.reconnect_delay, Duration::from_millis);

        Ok(Self {
            events_url,
            directions,
            animation_step,
            straight_line_steps,
            reconnect_delay,
        })
    }
}

/// Parse an optional variable, reporting the key on failure.
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, DashboardError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| DashboardError::Config(format!("invalid {key} {raw:?}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_straight_lines() {
        let config = DashboardConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert!(config.directions.is_none());
        assert_eq!(config.animation_step, Duration::from_millis(500));
    }

    #[test]
    fn token_enables_directions() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("MAPBOX_ACCESS_TOKEN", "pk.test"),
            ("RELAY_EVENTS_URL", "http://relay:3000/events"),
            ("ANIMATION_STEP_MS", "50"),
            ("RECONNECT_DELAY_MS", "100"),
        ]))
        .unwrap();
        let directions = config.directions.unwrap();
        assert_eq!(directions.access_token, "pk.test");
        assert_eq!(directions.api_url, DEFAULT_DIRECTIONS_API_URL);
        assert_eq!(config.events_url, "http://relay:3000/events");
        assert_eq!(config.animation_step, Duration::from_millis(50));
        assert_eq!(config.reconnect_delay, Duration::from_millis(100));
    }

    #[test]
    fn blank_token_means_no_directions() {
        let config =
            DashboardConfig::from_lookup(lookup_from(&[("MAPBOX_ACCESS_TOKEN", "  ")])).unwrap();
        assert!(config.directions.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(DashboardConfig::from_lookup(lookup_from(&[("ANIMATION_STEP_MS", "0")])).is_err());
        assert!(DashboardConfig::from_lookup(lookup_from(&[("ANIMATION_STEP_MS", "fast")])).is_err());
        assert!(DashboardConfig::from_lookup(lookup_from(&[("STRAIGHT_LINE_STEPS", "-1")])).is_err());
    }
}
