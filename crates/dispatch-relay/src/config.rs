//! Relay configuration loaded from environment variables.
//!
//! - `PORT` -- listen port (default `3000`)
//! - `RELAY_HOST` -- bind address (default `0.0.0.0`)
//! - `RELAY_STREAM_BUFFER` -- per-connection queue depth (default `256`)
//! - `LOG_FORMAT` -- `text` or `json` (default `text`)

use crate::error::RelayError;
use crate::server::ServerConfig;

/// Default per-connection queue depth.
pub const DEFAULT_STREAM_BUFFER: usize = 256;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Complete relay configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Listen address.
    pub server: ServerConfig,
    /// Envelopes queued per streaming connection before it is dropped
    /// as too slow.
    pub stream_buffer: usize,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            stream_buffer: DEFAULT_STREAM_BUFFER,
            log_format: LogFormat::Text,
        }
    }
}

impl RelayConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if a value is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| RelayError::Config(format!("invalid PORT {raw:?}: {e}")))?,
            None => defaults.server.port,
        };

        let host = lookup("RELAY_HOST").unwrap_or(defaults.server.host);

        let stream_buffer = match lookup("RELAY_STREAM_BUFFER") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(RelayError::Config(
                        "RELAY_STREAM_BUFFER must be at least 1".to_owned(),
                    ));
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(RelayError::Config(format!(
                        "invalid RELAY_STREAM_BUFFER {raw:?}: {e}"
                    )));
                }
            },
            None => defaults.stream_buffer,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("" | "text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(RelayError::Config(format!(
                    "invalid LOG_FORMAT {other:?} (expected text or json)"
                )));
            }
        };

        Ok(Self {
            server: ServerConfig { host, port },
            stream_buffer,
            log_format,
        })
    }
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
    fn defaults_to_port_3000() {
        let config = RelayConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.stream_buffer, DEFAULT_STREAM_BUFFER);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn reads_all_overrides() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("PORT", "8088"),
            ("RELAY_HOST", "127.0.0.1"),
            ("RELAY_STREAM_BUFFER", "16"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.stream_buffer, 16);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(RelayConfig::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
        assert!(RelayConfig::from_lookup(lookup_from(&[("PORT", "70000")])).is_err());
        assert!(RelayConfig::from_lookup(lookup_from(&[("RELAY_STREAM_BUFFER", "0")])).is_err());
        assert!(RelayConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")])).is_err());
    }
}
